use super::call::call_runtime_with_argument;
use super::stack::{pop_register, push_register};
use super::{AssemblyOutput, Compiler, Scope, SemanticError};
use crate::assembly::*;
use crate::ast::{Comparison, LValue, Statement, Test, Type};

fn jump(target: Label) -> Instruction {
    Instruction::Beq {
        lhs: Register::ZERO,
        rhs: Register::ZERO,
        target: BranchTarget::Label(target),
    }
}

fn branch_if_false(target: Label) -> Instruction {
    Instruction::Beq {
        lhs: Register::RESULT,
        rhs: Register::ZERO,
        target: BranchTarget::Label(target),
    }
}

/// `$3 = 1 - $3`
fn negate(out: &mut AssemblyOutput) {
    out.push_instruction(Instruction::Sub {
        target: Register::RESULT,
        lhs: Register::NULL,
        rhs: Register::RESULT,
    });
}

impl Compiler {
    pub(super) fn compile_statement(
        &mut self,
        scope: &Scope,
        statement: &Statement,
        out: &mut AssemblyOutput,
    ) {
        match statement {
            Statement::Assign { target, value } => {
                let value = self.compile_expr(scope, value, out);
                push_register(out, Register::RESULT);
                let target = match target.unparenthesized() {
                    LValue::Variable(name) => {
                        let found = self.lookup_variable(scope, name);
                        pop_register(out, Register::SCRATCH);
                        match found {
                            Some((ty, offset)) => {
                                out.push_instruction(Instruction::Sw {
                                    register: Register::SCRATCH,
                                    address: Memory::new(Register::FRAME, offset),
                                });
                                ty
                            }
                            None => Type::Int,
                        }
                    }
                    other => {
                        let ty = self.compile_address(scope, other, out);
                        pop_register(out, Register::SCRATCH);
                        out.push_instruction(Instruction::Sw {
                            register: Register::SCRATCH,
                            address: Memory::new(Register::RESULT, 0),
                        });
                        ty
                    }
                };
                if target != value {
                    self.report(scope.function, SemanticError::Assignment { target, value });
                }
            }
            Statement::If {
                test,
                then,
                otherwise,
            } => {
                let else_label = self.labels.new_label(LabelKind::Else);
                let end_label = self.labels.new_label(LabelKind::EndIf);
                self.compile_test(scope, test, out);
                out.push_instruction(branch_if_false(else_label.clone()));
                for statement in then {
                    self.compile_statement(scope, statement, out);
                }
                out.push_instruction(jump(end_label.clone()));
                out.push_label(else_label);
                for statement in otherwise {
                    self.compile_statement(scope, statement, out);
                }
                out.push_label(end_label);
            }
            Statement::While { test, body } => {
                let loop_label = self.labels.new_label(LabelKind::Loop);
                let end_label = self.labels.new_label(LabelKind::EndWhile);
                out.push_label(loop_label.clone());
                self.compile_test(scope, test, out);
                out.push_instruction(branch_if_false(end_label.clone()));
                for statement in body {
                    self.compile_statement(scope, statement, out);
                }
                out.push_instruction(jump(loop_label));
                out.push_label(end_label);
            }
            Statement::Println(value) => {
                let ty = self.compile_expr(scope, value, out);
                if ty != Type::Int {
                    self.report(scope.function, SemanticError::Println(ty));
                }
                call_runtime_with_argument(out, Runtime::Print);
            }
            Statement::Delete(value) => {
                let ty = self.compile_expr(scope, value, out);
                if ty != Type::IntPointer {
                    self.report(scope.function, SemanticError::Delete(ty));
                }
                let skip = self.labels.new_label(LabelKind::SkipDelete);
                out.push_instruction(Instruction::Beq {
                    lhs: Register::RESULT,
                    rhs: Register::NULL,
                    target: BranchTarget::Label(skip.clone()),
                });
                call_runtime_with_argument(out, Runtime::Delete);
                out.push_label(skip);
            }
        }
    }

    /// Leaves 1 in `$3` if the test holds, 0 otherwise.
    fn compile_test(&mut self, scope: &Scope, test: &Test, out: &mut AssemblyOutput) {
        let lhs = self.compile_expr(scope, &test.lhs, out);
        push_register(out, Register::RESULT);
        let rhs = self.compile_expr(scope, &test.rhs, out);
        pop_register(out, Register::SCRATCH);
        if lhs != rhs {
            self.report(scope.function, SemanticError::Comparison { lhs, rhs });
        }

        // pointers compare as addresses
        let signed = lhs == Type::Int;
        let slt = |target, lhs, rhs| Instruction::Slt {
            target,
            lhs,
            rhs,
            signed,
        };
        let (left, right) = (Register::SCRATCH, Register::RESULT);
        match test.comparison {
            Comparison::Less => out.push_instruction(slt(Register::RESULT, left, right)),
            Comparison::Greater => out.push_instruction(slt(Register::RESULT, right, left)),
            Comparison::GreaterEqual => {
                out.push_instruction(slt(Register::RESULT, left, right));
                negate(out);
            }
            Comparison::LessEqual => {
                out.push_instruction(slt(Register::RESULT, right, left));
                negate(out);
            }
            Comparison::NotEquals | Comparison::Equals => {
                out.push_instruction(slt(Register::LESS, right, left));
                out.push_instruction(slt(Register::GREATER, left, right));
                out.push_instruction(Instruction::Add {
                    target: Register::RESULT,
                    lhs: Register::LESS,
                    rhs: Register::GREATER,
                });
                if test.comparison == Comparison::Equals {
                    negate(out);
                }
            }
        }
    }
}
