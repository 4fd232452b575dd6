use super::call::call_runtime_with_argument;
use super::stack::{load_constant, pop_register, push_register};
use super::{AssemblyOutput, Compiler, Scope, SemanticError};
use crate::assembly::*;
use crate::ast::{AdditiveOp, Expr, Factor, LValue, MultiplicativeOp, Term, Type};

/// `$5` holds the left operand, `$3` the right one; the result goes to `$3`.
fn additive_instruction(operator: AdditiveOp) -> Instruction {
    let (target, lhs, rhs) = (Register::RESULT, Register::SCRATCH, Register::RESULT);
    match operator {
        AdditiveOp::Add => Instruction::Add { target, lhs, rhs },
        AdditiveOp::Subtract => Instruction::Sub { target, lhs, rhs },
    }
}

/// Multiplies `register` by the word size, turning an element count into a byte offset.
fn scale_to_words(out: &mut AssemblyOutput, register: Register) {
    out.push_instruction(Instruction::Mult {
        lhs: register,
        rhs: Register::WORD_SIZE,
        signed: true,
    });
    out.push_instruction(Instruction::Mflo(register));
}

impl Compiler {
    pub(super) fn compile_expr(
        &mut self,
        scope: &Scope,
        expr: &Expr,
        out: &mut AssemblyOutput,
    ) -> Type {
        match expr {
            Expr::Term(term) => self.compile_term(scope, term, out),
            Expr::Binary { operator, lhs, rhs } => {
                let lhs = self.compile_expr(scope, lhs, out);
                push_register(out, Register::RESULT);
                let rhs = self.compile_term(scope, rhs, out);
                pop_register(out, Register::SCRATCH);
                self.compile_additive(scope, *operator, lhs, rhs, out)
            }
        }
    }

    fn compile_additive(
        &mut self,
        scope: &Scope,
        operator: AdditiveOp,
        lhs: Type,
        rhs: Type,
        out: &mut AssemblyOutput,
    ) -> Type {
        tracing::trace!(target: "compiler::expr", "{lhs} {operator} {rhs}");
        match (operator, lhs, rhs) {
            (_, Type::Int, Type::Int) => {
                out.push_instruction(additive_instruction(operator));
                Type::Int
            }
            (_, Type::IntPointer, Type::Int) => {
                scale_to_words(out, Register::RESULT);
                out.push_instruction(additive_instruction(operator));
                Type::IntPointer
            }
            (AdditiveOp::Add, Type::Int, Type::IntPointer) => {
                scale_to_words(out, Register::SCRATCH);
                out.push_instruction(additive_instruction(operator));
                Type::IntPointer
            }
            (AdditiveOp::Subtract, Type::IntPointer, Type::IntPointer) => {
                out.push_instruction(additive_instruction(operator));
                out.push_instruction(Instruction::Div {
                    lhs: Register::RESULT,
                    rhs: Register::WORD_SIZE,
                    signed: true,
                });
                out.push_instruction(Instruction::Mflo(Register::RESULT));
                Type::Int
            }
            _ => {
                self.report(
                    scope.function,
                    SemanticError::InvalidOperands {
                        operator: operator.to_string(),
                        lhs,
                        rhs,
                    },
                );
                out.push_instruction(additive_instruction(operator));
                Type::Int
            }
        }
    }

    fn compile_term(&mut self, scope: &Scope, term: &Term, out: &mut AssemblyOutput) -> Type {
        match term {
            Term::Factor(factor) => self.compile_factor(scope, factor, out),
            Term::Binary { operator, lhs, rhs } => {
                let lhs = self.compile_term(scope, lhs, out);
                push_register(out, Register::RESULT);
                let rhs = self.compile_factor(scope, rhs, out);
                pop_register(out, Register::SCRATCH);
                if (lhs, rhs) != (Type::Int, Type::Int) {
                    self.report(
                        scope.function,
                        SemanticError::InvalidOperands {
                            operator: operator.to_string(),
                            lhs,
                            rhs,
                        },
                    );
                }
                let (lhs, rhs) = (Register::SCRATCH, Register::RESULT);
                match operator {
                    MultiplicativeOp::Multiply => {
                        out.push_instruction(Instruction::Mult { lhs, rhs, signed: true });
                        out.push_instruction(Instruction::Mflo(Register::RESULT));
                    }
                    MultiplicativeOp::Divide => {
                        out.push_instruction(Instruction::Div { lhs, rhs, signed: true });
                        out.push_instruction(Instruction::Mflo(Register::RESULT));
                    }
                    MultiplicativeOp::Modulo => {
                        out.push_instruction(Instruction::Div { lhs, rhs, signed: true });
                        out.push_instruction(Instruction::Mfhi(Register::RESULT));
                    }
                }
                Type::Int
            }
        }
    }

    fn compile_factor(&mut self, scope: &Scope, factor: &Factor, out: &mut AssemblyOutput) -> Type {
        match factor {
            Factor::Variable(name) => match self.lookup_variable(scope, name) {
                Some((ty, offset)) => {
                    out.push_instruction(Instruction::Lw {
                        register: Register::RESULT,
                        address: Memory::new(Register::FRAME, offset),
                    });
                    ty
                }
                None => Type::Int,
            },
            Factor::Number(value) => {
                load_constant(out, Register::RESULT, Word::Value(*value));
                Type::Int
            }
            Factor::Null => {
                out.push_instruction(Instruction::Add {
                    target: Register::RESULT,
                    lhs: Register::ZERO,
                    rhs: Register::NULL,
                });
                Type::IntPointer
            }
            Factor::Parenthesized(expr) => self.compile_expr(scope, expr, out),
            Factor::AddressOf(lvalue) => {
                let ty = self.compile_address(scope, lvalue, out);
                if ty != Type::Int {
                    self.report(scope.function, SemanticError::AddressOf(ty));
                }
                Type::IntPointer
            }
            Factor::Dereference(inner) => {
                self.compile_pointer(scope, inner, out);
                out.push_instruction(Instruction::Lw {
                    register: Register::RESULT,
                    address: Memory::new(Register::RESULT, 0),
                });
                Type::Int
            }
            Factor::New(size) => {
                let ty = self.compile_expr(scope, size, out);
                if ty != Type::Int {
                    self.report(scope.function, SemanticError::NewSize(ty));
                }
                call_runtime_with_argument(out, Runtime::New);
                // a failed allocation comes back as 0; hand out NULL instead
                out.push_instruction(Instruction::Bne {
                    lhs: Register::RESULT,
                    rhs: Register::ZERO,
                    target: BranchTarget::Skip(1),
                });
                out.push_instruction(Instruction::Add {
                    target: Register::RESULT,
                    lhs: Register::NULL,
                    rhs: Register::ZERO,
                });
                Type::IntPointer
            }
            Factor::Call { name, args } => self.compile_call(scope, name, args, out),
        }
    }

    /// Compiles a factor that is about to be dereferenced, leaving the address in `$3`.
    fn compile_pointer(&mut self, scope: &Scope, factor: &Factor, out: &mut AssemblyOutput) {
        let ty = self.compile_factor(scope, factor, out);
        if ty != Type::IntPointer {
            self.report(scope.function, SemanticError::Dereference(ty));
        }
    }

    /// Leaves the address of `lvalue` in `$3` and returns the type stored there.
    pub(super) fn compile_address(
        &mut self,
        scope: &Scope,
        lvalue: &LValue,
        out: &mut AssemblyOutput,
    ) -> Type {
        match lvalue {
            LValue::Variable(name) => match self.lookup_variable(scope, name) {
                Some((ty, offset)) => {
                    load_constant(out, Register::RESULT, Word::Value(offset));
                    out.push_instruction(Instruction::Add {
                        target: Register::RESULT,
                        lhs: Register::RESULT,
                        rhs: Register::FRAME,
                    });
                    ty
                }
                None => Type::Int,
            },
            LValue::Dereference(factor) => {
                self.compile_pointer(scope, factor, out);
                Type::Int
            }
            LValue::Parenthesized(inner) => self.compile_address(scope, inner, out),
        }
    }
}
