//! Typed view of the derivation tree: one variant per grammar production, so the code
//! generator never has to check child counts.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    IntPointer,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::IntPointer => write!(f, "int*"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// In source order; `wain` always comes last in the source.
    pub procedures: Vec<Procedure>,
    pub main: Main,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Procedure {
    pub name: Identifier,
    pub params: Vec<Declaration>,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Main {
    pub first: Declaration,
    pub second: Declaration,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    pub declarations: Vec<InitializedDeclaration>,
    pub statements: Vec<Statement>,
    pub return_expr: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub ty: Type,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializedDeclaration {
    pub declaration: Declaration,
    pub init: Initializer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initializer {
    Number(i32),
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Assign {
        target: LValue,
        value: Expr,
    },
    If {
        test: Test,
        then: Vec<Statement>,
        otherwise: Vec<Statement>,
    },
    While {
        test: Test,
        body: Vec<Statement>,
    },
    Println(Expr),
    Delete(Expr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Test {
    pub comparison: Comparison,
    pub lhs: Expr,
    pub rhs: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equals,
    NotEquals,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl Comparison {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "EQ" => Self::Equals,
            "NE" => Self::NotEquals,
            "LT" => Self::Less,
            "LE" => Self::LessEqual,
            "GT" => Self::Greater,
            "GE" => Self::GreaterEqual,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Term(Term),
    Binary {
        operator: AdditiveOp,
        lhs: Box<Expr>,
        rhs: Term,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Factor(Factor),
    Binary {
        operator: MultiplicativeOp,
        lhs: Box<Term>,
        rhs: Factor,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Factor {
    Variable(String),
    Number(i32),
    Null,
    Parenthesized(Box<Expr>),
    AddressOf(Box<LValue>),
    Dereference(Box<Factor>),
    /// `new int[size]`
    New(Box<Expr>),
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LValue {
    Variable(String),
    Dereference(Box<Factor>),
    Parenthesized(Box<LValue>),
}

impl LValue {
    /// The lvalue with every layer of parentheses removed.
    pub fn unparenthesized(&self) -> &Self {
        let mut current = self;
        while let Self::Parenthesized(inner) = current {
            current = inner;
        }
        current
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditiveOp {
    /// `+` operator
    Add,
    /// `-` (binary) operator
    Subtract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiplicativeOp {
    /// `*` (binary) operator
    Multiply,
    /// `/` operator
    Divide,
    /// `%` operator
    Modulo,
}

impl AdditiveOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "PLUS" => Some(Self::Add),
            "MINUS" => Some(Self::Subtract),
            _ => None,
        }
    }
}

impl MultiplicativeOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "STAR" => Some(Self::Multiply),
            "SLASH" => Some(Self::Divide),
            "PCT" => Some(Self::Modulo),
            _ => None,
        }
    }
}

impl fmt::Display for AdditiveOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Add => write!(f, "+"),
            Self::Subtract => write!(f, "-"),
        }
    }
}

impl fmt::Display for MultiplicativeOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Multiply => write!(f, "*"),
            Self::Divide => write!(f, "/"),
            Self::Modulo => write!(f, "%"),
        }
    }
}
