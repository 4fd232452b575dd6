pub mod assembly;
pub mod ast;
pub mod compiler;
pub mod error;
pub mod parser;
pub mod tree;
pub mod variables;

#[cfg(test)]
mod testing;

use compiler::{Compilation, Compiler, Diagnostic};
use itertools::Itertools;
use parser::ShapeErrorKind;
use thiserror::Error;
use tree::TreeErrorKind;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Reject the program (and drop its output) if there is any diagnostic.
    pub strict: bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralErrorKind {
    #[error(transparent)]
    Tree(#[from] TreeErrorKind),
    #[error(transparent)]
    Shape(#[from] ShapeErrorKind),
}

/// The derivation itself is malformed; nothing can be compiled from it.
pub type StructuralError = error::Error<StructuralErrorKind>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("{0}")]
    Structural(#[from] StructuralError),
    #[error("program rejected with {} diagnostic(s):\n{}", .0.len(), .0.iter().join("\n"))]
    Rejected(Vec<Diagnostic>),
}

/// Compiles a derivation listing, one production or terminal per line.
pub fn compile(derivation: &str, options: CompileOptions) -> Result<Compilation, CompileError> {
    let tree = tree::build_tree(derivation.lines())
        .map_err(|e| e.map_kind(StructuralErrorKind::from))?;
    let program: ast::Program =
        parser::parse(&tree).map_err(|e| e.map_kind(StructuralErrorKind::from))?;
    tracing::debug!(
        target: "wlpc",
        "read {} procedure(s) besides wain",
        program.procedures.len()
    );
    let compilation = Compiler::new().compile(&program);
    if options.strict && !compilation.is_clean() {
        return Err(CompileError::Rejected(compilation.diagnostics));
    }
    Ok(compilation)
}
