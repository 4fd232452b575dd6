use super::stack::{load_constant, pop_register, push_register};
use super::{AssemblyOutput, Compiler, Scope, SemanticError};
use crate::assembly::*;
use crate::ast::{Expr, Type};
use itertools::{EitherOrBoth, Itertools};

/// Calls a runtime routine, saving the frame pointer and return address around it.
pub(super) fn call_runtime(out: &mut AssemblyOutput, routine: Runtime) {
    push_register(out, Register::FRAME);
    push_register(out, Register::RETURN_ADDRESS);
    load_constant(out, Register::SCRATCH, Word::Runtime(routine));
    out.push_instruction(Instruction::Jalr(Register::SCRATCH));
    pop_register(out, Register::RETURN_ADDRESS);
    pop_register(out, Register::FRAME);
}

/// Same as [`call_runtime`], passing `$3` as the argument in `$1`.
pub(super) fn call_runtime_with_argument(out: &mut AssemblyOutput, routine: Runtime) {
    push_register(out, Register::ARG1);
    out.push_instruction(Instruction::Add {
        target: Register::ARG1,
        lhs: Register::RESULT,
        rhs: Register::ZERO,
    });
    call_runtime(out, routine);
    pop_register(out, Register::ARG1);
}

impl Compiler {
    /// Arguments are pushed left to right; the callee pops them in its epilogue.
    pub(super) fn compile_call(
        &mut self,
        scope: &Scope,
        name: &str,
        args: &[Expr],
        out: &mut AssemblyOutput,
    ) -> Type {
        tracing::trace!(target: "compiler::call", "call to {name} with {} arguments", args.len());
        push_register(out, Register::FRAME);
        push_register(out, Register::RETURN_ADDRESS);
        let mut found = Vec::with_capacity(args.len());
        for arg in args {
            found.push(self.compile_expr(scope, arg, out));
            push_register(out, Register::RESULT);
        }

        match self.symbols.procedures().signature(name).map(<[Type]>::to_vec) {
            Some(expected) => self.check_arguments(scope, name, &expected, &found),
            None => self.report(
                scope.function,
                SemanticError::UndeclaredProcedure(name.to_string()),
            ),
        }

        load_constant(out, Register::SCRATCH, Word::Label(Label::Procedure(name.to_string())));
        out.push_instruction(Instruction::Jalr(Register::SCRATCH));
        pop_register(out, Register::RETURN_ADDRESS);
        pop_register(out, Register::FRAME);
        Type::Int
    }

    fn check_arguments(&mut self, scope: &Scope, name: &str, expected: &[Type], found: &[Type]) {
        let mut too_many = false;
        let mut too_few = false;
        for (index, pair) in expected.iter().zip_longest(found).enumerate() {
            match pair {
                EitherOrBoth::Both(expected, found) if expected != found => self.report(
                    scope.function,
                    SemanticError::ArgumentType {
                        name: name.to_string(),
                        position: index + 1,
                        expected: *expected,
                        found: *found,
                    },
                ),
                EitherOrBoth::Both(..) => {}
                EitherOrBoth::Left(_) => too_few = true,
                EitherOrBoth::Right(_) => too_many = true,
            }
        }
        if too_many {
            self.report(
                scope.function,
                SemanticError::TooManyArguments {
                    name: name.to_string(),
                    expected: expected.len(),
                    found: found.len(),
                },
            );
        }
        if too_few {
            self.report(
                scope.function,
                SemanticError::TooFewArguments {
                    name: name.to_string(),
                    expected: expected.len(),
                    found: found.len(),
                },
            );
        }
    }
}
