use super::{AssemblyOutput, Compilation, Compiler};
use crate::assembly::*;
use crate::ast::Program;
use crate::compiler::stack::load_constant;

impl Compiler {
    /// Procedures are analyzed in source order and `wain` last, so a procedure only sees the
    /// ones above it. `wain` is still emitted first since execution starts at the first word.
    pub fn compile(mut self, program: &Program) -> Compilation {
        let procedures: Vec<AssemblyOutput> = program
            .procedures
            .iter()
            .map(|procedure| self.compile_procedure(procedure))
            .collect();
        let main = self.compile_main(&program.main);

        let mut output = header();
        output.extend(main);
        for procedure in procedures {
            output.extend(procedure);
        }
        tracing::info!(
            target: "compiler",
            "emitted {} lines with {} diagnostics",
            output.len(),
            self.diagnostics.len()
        );
        Compilation {
            output,
            diagnostics: self.diagnostics,
            symbols: self.symbols,
        }
    }
}

fn header() -> AssemblyOutput {
    let mut out = AssemblyOutput::new();
    for routine in Runtime::ALL {
        out.push_directive(Directive::Import(routine));
    }
    load_constant(&mut out, Register::WORD_SIZE, Word::Value(4));
    load_constant(&mut out, Register::NULL, Word::Value(1));
    out
}
