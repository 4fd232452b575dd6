use super::call::call_runtime;
use super::stack::{discard_words, load_constant, pop_register, push_register};
use super::{AssemblyOutput, Compiler, Scope, SemanticError};
use crate::assembly::*;
use crate::ast::{
    Body, Declaration, Identifier, Initializer, InitializedDeclaration, Main, Procedure, Type,
};
use crate::variables::{FrameBuilder, WORD_SIZE};

const MAIN: &str = "wain";

impl Compiler {
    pub(super) fn compile_main(&mut self, main: &Main) -> AssemblyOutput {
        tracing::debug!(target: "compiler::function", "compiling {MAIN}");
        let mut out = AssemblyOutput::new();
        self.symbols.procedures_mut().declare(MAIN);
        out.push_label(Label::Main);
        out.push_instruction(Instruction::Sub {
            target: Register::FRAME,
            lhs: Register::STACK,
            rhs: Register::WORD_SIZE,
        });

        // an `int*` first parameter means (array, length); `init` reads the length from $2
        push_register(&mut out, Register::ARG2);
        if main.first.ty == Type::Int {
            out.push_instruction(Instruction::Add {
                target: Register::ARG2,
                lhs: Register::ZERO,
                rhs: Register::ZERO,
            });
        }
        call_runtime(&mut out, Runtime::Init);
        pop_register(&mut out, Register::ARG2);

        let mut frame = FrameBuilder::new();
        for (param, register) in [(&main.first, Register::ARG1), (&main.second, Register::ARG2)] {
            self.declare_parameter(MAIN, &mut frame, param);
            push_register(&mut out, register);
        }
        if main.second.ty != Type::Int {
            self.report(MAIN, SemanticError::MainSecondParameter(main.second.ty));
        }

        out.extend(self.compile_body(MAIN, frame, &main.body));
        out
    }

    /// The caller has pushed the arguments already, first argument first.
    pub(super) fn compile_procedure(&mut self, procedure: &Procedure) -> AssemblyOutput {
        let Identifier(name) = &procedure.name;
        tracing::debug!(target: "compiler::function", "compiling procedure {name}");
        let mut out = AssemblyOutput::new();
        if !self.symbols.procedures_mut().declare(name) {
            self.report(name, SemanticError::RedeclaredProcedure(name.clone()));
        }
        out.push_label(Label::Procedure(name.clone()));

        match procedure.params.len() {
            0 => out.push_instruction(Instruction::Sub {
                target: Register::FRAME,
                lhs: Register::STACK,
                rhs: Register::WORD_SIZE,
            }),
            count => {
                load_constant(
                    &mut out,
                    Register::SCRATCH,
                    Word::Value(WORD_SIZE * (count as i32 - 1)),
                );
                out.push_instruction(Instruction::Add {
                    target: Register::FRAME,
                    lhs: Register::STACK,
                    rhs: Register::SCRATCH,
                });
            }
        }

        let mut frame = FrameBuilder::new();
        for param in &procedure.params {
            self.declare_parameter(name, &mut frame, param);
        }

        out.extend(self.compile_body(name, frame, &procedure.body));
        out
    }

    fn declare_parameter(&mut self, function: &str, frame: &mut FrameBuilder, param: &Declaration) {
        if !frame.declare(&param.name, param.ty) {
            self.report(function, SemanticError::RedeclaredVariable(param.name.clone()));
        }
        self.symbols
            .procedures_mut()
            .push_parameter(function, param.ty);
    }

    /// Pushes the initialized locals, compiles the statements and the return value into `$3`,
    /// then pops the whole frame and returns.
    fn compile_body(
        &mut self,
        function: &str,
        mut builder: FrameBuilder,
        body: &Body,
    ) -> AssemblyOutput {
        let mut out = AssemblyOutput::new();
        for InitializedDeclaration { declaration, init } in &body.declarations {
            let expected = match init {
                Initializer::Number(value) => {
                    load_constant(&mut out, Register::SCRATCH, Word::Value(*value));
                    push_register(&mut out, Register::SCRATCH);
                    Type::Int
                }
                Initializer::Null => {
                    push_register(&mut out, Register::NULL);
                    Type::IntPointer
                }
            };
            if declaration.ty != expected {
                self.report(
                    function,
                    SemanticError::Initializer {
                        name: declaration.name.clone(),
                        declared: declaration.ty,
                        initializer: match init {
                            Initializer::Number(_) => "a number",
                            Initializer::Null => "NULL",
                        },
                    },
                );
            }
            if !builder.declare(&declaration.name, declaration.ty) {
                self.report(
                    function,
                    SemanticError::RedeclaredVariable(declaration.name.clone()),
                );
            }
        }

        let frame = builder.finalize();
        tracing::debug!(target: "compiler::frame", "{function}: {:?}", frame.offsets());

        let scope = Scope {
            function,
            frame: &frame,
        };
        for statement in &body.statements {
            self.compile_statement(&scope, statement, &mut out);
        }
        let returned = self.compile_expr(&scope, &body.return_expr, &mut out);
        if returned != Type::Int {
            self.report(function, SemanticError::ReturnType(returned));
        }

        discard_words(&mut out, frame.slot_count());
        out.push_instruction(Instruction::Jr(Register::RETURN_ADDRESS));
        self.symbols.insert_frame(function, frame);
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::Type;
    use crate::compiler::SemanticError;
    use crate::testing::*;

    #[test]
    fn sum_of_parameters_is_clean() -> anyhow::Result<()> {
        let listing = wain_ints(&[], &[], e_op(var("a"), "PLUS", tf(f_id("b"))));
        let compilation = compile_listing(&listing)?;
        assert!(compilation.is_clean(), "{:?}", compilation.diagnostics);
        let frame = compilation.symbols.frame("wain").expect("wain has a frame");
        assert_eq!(frame.offset_of("a"), Some(0));
        assert_eq!(frame.offset_of("b"), Some(-4));
        assert_eq!(
            compilation.symbols.procedures().signature("wain"),
            Some(&[Type::Int, Type::Int][..])
        );
        let lines = compilation.output.lines();
        assert!(contains_run(
            &lines,
            &["lw $3, 0($29)", "sw $3, -4($30)", "sub $30, $30, $4", "lw $3, -4($29)"]
        ));
        assert!(contains_run(&lines, &["add $3, $5, $3"]));
        Ok(())
    }

    #[test]
    fn wain_prologue_zeroes_length_for_int_first_parameter() -> anyhow::Result<()> {
        let compilation = compile_listing(&wain_ints(&[], &[], var("a")))?;
        assert!(contains_run(
            &compilation.output.lines(),
            &[
                "wain:",
                "sub $29, $30, $4",
                "sw $2, -4($30)",
                "sub $30, $30, $4",
                "add $2, $0, $0",
                "sw $29, -4($30)",
                "sub $30, $30, $4",
                "sw $31, -4($30)",
                "sub $30, $30, $4",
                "lis $5",
                ".word init",
                "jalr $5",
            ]
        ));
        Ok(())
    }

    #[test]
    fn array_wain_passes_length_through() -> anyhow::Result<()> {
        let listing = program(
            &[],
            main_fn(dcl("int*", "arr"), dcl("int", "len"), &[], &[], var("len")),
        );
        let compilation = compile_listing(&listing)?;
        assert!(compilation.is_clean(), "{:?}", compilation.diagnostics);
        assert!(!compilation.output.lines().contains(&"add $2, $0, $0".to_string()));
        Ok(())
    }

    #[test]
    fn pointer_return_from_wain_is_one_return_error() -> anyhow::Result<()> {
        let listing = program(
            &[],
            main_fn(dcl("int", "a"), dcl("int*", "b"), &[], &[], var("b")),
        );
        let compilation = compile_listing(&listing)?;
        let return_errors = compilation
            .diagnostics
            .iter()
            .filter(|d| matches!(d.error, SemanticError::ReturnType(Type::IntPointer)))
            .count();
        assert_eq!(return_errors, 1);
        assert!(compilation
            .diagnostics
            .iter()
            .any(|d| d.error == SemanticError::MainSecondParameter(Type::IntPointer)));
        let lines = compilation.output.lines();
        assert!(lines.contains(&"wain:".to_string()));
        assert!(contains_run(
            &lines,
            &["lw $3, -4($29)", "add $30, $30, $4", "add $30, $30, $4", "jr $31"]
        ));
        Ok(())
    }

    #[test]
    fn declarations_are_pushed_in_order() -> anyhow::Result<()> {
        let listing = wain_ints(
            &[
                (dcl("int", "c"), Init::Num(7)),
                (dcl("int*", "p"), Init::Null),
            ],
            &[],
            var("c"),
        );
        let compilation = compile_listing(&listing)?;
        assert!(compilation.is_clean(), "{:?}", compilation.diagnostics);
        let frame = compilation.symbols.frame("wain").expect("wain has a frame");
        assert_eq!(frame.declaration_order(), ["a", "b", "c", "p"]);
        assert_eq!(frame.offset_of("c"), Some(-8));
        assert_eq!(frame.offset_of("p"), Some(-12));
        let lines = compilation.output.lines();
        assert!(contains_run(
            &lines,
            &[
                "lis $5",
                ".word 7",
                "sw $5, -4($30)",
                "sub $30, $30, $4",
                "sw $11, -4($30)",
                "sub $30, $30, $4",
            ]
        ));
        assert!(contains_run(
            &lines,
            &[
                "lw $3, -8($29)",
                "add $30, $30, $4",
                "add $30, $30, $4",
                "add $30, $30, $4",
                "add $30, $30, $4",
                "jr $31"
            ]
        ));
        Ok(())
    }

    #[test]
    fn redeclaration_keeps_first_type_and_takes_a_slot() -> anyhow::Result<()> {
        let listing = wain_ints(
            &[
                (dcl("int", "x"), Init::Num(1)),
                (dcl("int*", "x"), Init::Null),
            ],
            &[],
            var("x"),
        );
        let compilation = compile_listing(&listing)?;
        assert_eq!(
            compilation
                .diagnostics
                .iter()
                .map(|d| &d.error)
                .collect::<Vec<_>>(),
            [&SemanticError::RedeclaredVariable("x".to_string())]
        );
        let frame = compilation.symbols.frame("wain").expect("wain has a frame");
        assert_eq!(frame.declaration_order(), ["a", "b", "x", "x"]);
        assert_eq!(frame.type_of("x"), Some(Type::Int));
        Ok(())
    }

    #[test]
    fn mismatched_initializers_are_reported() -> anyhow::Result<()> {
        let listing = wain_ints(
            &[
                (dcl("int*", "p"), Init::Num(3)),
                (dcl("int", "n"), Init::Null),
            ],
            &[],
            var("a"),
        );
        let compilation = compile_listing(&listing)?;
        assert_eq!(compilation.diagnostics.len(), 2);
        assert!(compilation.diagnostics.iter().all(|d| matches!(
            d.error,
            SemanticError::Initializer { .. }
        )));
        Ok(())
    }

    #[test]
    fn procedure_frame_starts_at_first_argument() -> anyhow::Result<()> {
        let pick = procedure(
            "pick",
            &[dcl("int", "x"), dcl("int*", "y"), dcl("int", "z")],
            &[(dcl("int", "local"), Init::Num(0))],
            &[],
            var("z"),
        );
        let listing = program(
            &[pick],
            main_fn(dcl("int", "a"), dcl("int", "b"), &[], &[], var("a")),
        );
        let compilation = compile_listing(&listing)?;
        assert!(compilation.is_clean(), "{:?}", compilation.diagnostics);
        let lines = compilation.output.lines();
        assert!(contains_run(
            &lines,
            &["Fpick:", "lis $5", ".word 8", "add $29, $30, $5"]
        ));
        let frame = compilation.symbols.frame("pick").expect("pick has a frame");
        assert_eq!(frame.offset_of("z"), Some(-8));
        assert_eq!(frame.offset_of("local"), Some(-12));
        assert_eq!(
            compilation.symbols.procedures().signature("pick"),
            Some(&[Type::Int, Type::IntPointer, Type::Int][..])
        );
        Ok(())
    }

    #[test]
    fn procedure_without_parameters_uses_next_slot() -> anyhow::Result<()> {
        let listing = program(
            &[procedure("zero", &[], &[], &[], num(0))],
            main_fn(dcl("int", "a"), dcl("int", "b"), &[], &[], var("a")),
        );
        let compilation = compile_listing(&listing)?;
        assert!(contains_run(
            &compilation.output.lines(),
            &["Fzero:", "sub $29, $30, $4", "lis $3", ".word 0", "jr $31"]
        ));
        Ok(())
    }
}
