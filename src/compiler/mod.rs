//! Type checking and code generation, done together in one depth-first walk over the
//! [`ast`](crate::ast).
//!
//! Semantic errors never stop the walk: they are recorded as [`Diagnostic`]s, the offending
//! expression gets a fallback type and code is emitted as if the program were well typed.
mod call;
mod expr;
mod function;
pub mod labels;
mod program;
pub mod stack;
mod statement;

use crate::assembly::*;
use crate::ast::Type;
use crate::variables::{Frame, SymbolTable};
use labels::LabelGenerator;
use std::fmt;
use thiserror::Error;

/// Append-only instruction stream of one function (or of the whole program, once the
/// functions are joined).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssemblyOutput {
    inner: Vec<Assembly>,
}

impl AssemblyOutput {
    pub fn new() -> Self {
        Self { inner: Vec::new() }
    }
    #[inline]
    pub fn push_asm(&mut self, asm: Assembly) {
        self.inner.push(asm);
    }
    #[inline]
    pub fn push_instruction(&mut self, instruction: Instruction) {
        self.push_asm(Assembly::Instruction(instruction))
    }
    #[inline]
    pub fn push_directive(&mut self, directive: Directive) {
        self.push_asm(Assembly::Directive(directive))
    }
    #[inline]
    pub fn push_label(&mut self, label: Label) {
        self.push_asm(Assembly::Label(label))
    }
    pub fn extend(&mut self, other: Self) {
        self.inner.extend(other.inner);
    }
    pub fn len(&self) -> usize {
        self.inner.len()
    }
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
    /// Rendered text, one item per line.
    pub fn lines(&self) -> Vec<String> {
        self.inner.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for AssemblyOutput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for asm in &self.inner {
            writeln!(f, "{}", asm)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("variable `{0}` was not declared")]
    UndeclaredVariable(String),
    #[error("variable `{0}` was already declared")]
    RedeclaredVariable(String),
    #[error("procedure `{0}` was already declared")]
    RedeclaredProcedure(String),
    #[error("procedure `{0}` was not declared")]
    UndeclaredProcedure(String),
    #[error("too many arguments passed to `{name}`: expected {expected}, found {found}")]
    TooManyArguments {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("too few arguments passed to `{name}`: expected {expected}, found {found}")]
    TooFewArguments {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("argument {position} of `{name}` should be `{expected}`, found `{found}`")]
    ArgumentType {
        name: String,
        position: usize,
        expected: Type,
        found: Type,
    },
    #[error("cannot take the address of a `{0}`")]
    AddressOf(Type),
    #[error("cannot dereference a `{0}`")]
    Dereference(Type),
    #[error("size of `new int[]` must be `int`, found `{0}`")]
    NewSize(Type),
    #[error("invalid operands to `{operator}`: `{lhs}` and `{rhs}`")]
    InvalidOperands {
        operator: String,
        lhs: Type,
        rhs: Type,
    },
    #[error("cannot compare `{lhs}` with `{rhs}`")]
    Comparison { lhs: Type, rhs: Type },
    #[error("cannot assign `{value}` to an lvalue of type `{target}`")]
    Assignment { target: Type, value: Type },
    #[error("`{name}` is declared `{declared}` but initialized with {initializer}")]
    Initializer {
        name: String,
        declared: Type,
        initializer: &'static str,
    },
    #[error("println expects `int`, found `{0}`")]
    Println(Type),
    #[error("delete [] expects `int*`, found `{0}`")]
    Delete(Type),
    #[error("second parameter of wain must be `int`, found `{0}`")]
    MainSecondParameter(Type),
    #[error("return value must be `int`, found `{0}`")]
    ReturnType(Type),
}

/// A [`SemanticError`] and the function it was found in.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("in `{function}`: {error}")]
pub struct Diagnostic {
    pub function: String,
    pub error: SemanticError,
}

/// Everything one run of the compiler produces.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub output: AssemblyOutput,
    pub diagnostics: Vec<Diagnostic>,
    pub symbols: SymbolTable,
}

impl Compilation {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// What statements and expressions of one function can see.
pub(crate) struct Scope<'a> {
    function: &'a str,
    frame: &'a Frame,
}

/// State of one compilation. Construct a fresh one per program.
#[derive(Debug, Default)]
pub struct Compiler {
    symbols: SymbolTable,
    labels: LabelGenerator,
    diagnostics: Vec<Diagnostic>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    fn report(&mut self, function: &str, error: SemanticError) {
        tracing::debug!(target: "compiler::diagnostic", "{function}: {error}");
        self.diagnostics.push(Diagnostic {
            function: function.to_string(),
            error,
        });
    }

    /// Looks a variable up, reporting it if it isn't declared in this function.
    fn lookup_variable(&mut self, scope: &Scope, name: &str) -> Option<(Type, i32)> {
        let found = scope
            .frame
            .type_of(name)
            .zip(scope.frame.offset_of(name));
        if found.is_none() {
            self.report(
                scope.function,
                SemanticError::UndeclaredVariable(name.to_string()),
            );
        }
        found
    }
}
