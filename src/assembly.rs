use crate::write_instruction;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assembly {
    Directive(Directive),
    Label(Label),
    Instruction(Instruction),
}

impl fmt::Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Directive(direct) => write!(f, ".{}", direct),
            Self::Instruction(instr) => write!(f, "{}", instr),
            Self::Label(label) => write!(f, "{}:", label),
        }
    }
}

impl From<Instruction> for Assembly {
    fn from(instr: Instruction) -> Self {
        Self::Instruction(instr)
    }
}

impl From<Directive> for Assembly {
    fn from(d: Directive) -> Self {
        Self::Directive(d)
    }
}

impl From<Label> for Assembly {
    fn from(label: Label) -> Self {
        Self::Label(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Declares a runtime-support routine provided at link time
    Import(Runtime),
    /// Embeds a 32 bit word (usually right after a `lis`)
    Word(Word),
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Import(routine) => write!(f, "import {}", routine),
            Self::Word(word) => write!(f, "word {}", word),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Word {
    Value(i32),
    Label(Label),
    Runtime(Runtime),
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{}", value),
            Self::Label(label) => write!(f, "{}", label),
            Self::Runtime(routine) => write!(f, "{}", routine),
        }
    }
}

/// Routines linked in from the runtime library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
    /// Prints `$1` as a decimal followed by a newline
    Print,
    /// Initializes the heap; takes the array (or nothing) in `$1`/`$2`
    Init,
    /// Allocates `$1` words, returns the address (or 0) in `$3`
    New,
    /// Frees the allocation at `$1`
    Delete,
}

impl Runtime {
    pub const ALL: [Self; 4] = [Self::Print, Self::Init, Self::New, Self::Delete];
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Print => write!(f, "print"),
            Self::Init => write!(f, "init"),
            Self::New => write!(f, "new"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    /// Entry point of `wain`
    Main,
    /// Entry point of a user procedure. Rendered with an `F` prefix, so it can't clash with
    /// `wain`, the runtime imports or control-flow labels.
    Procedure(String),
    /// Control-flow label, numbered by the
    /// [`LabelGenerator`](crate::compiler::labels::LabelGenerator)
    Local { kind: LabelKind, num: usize },
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Main => write!(f, "wain"),
            Self::Procedure(name) => write!(f, "F{}", name),
            Self::Local { kind, num } => write!(f, "{}{}", kind, num),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    Else,
    EndIf,
    Loop,
    EndWhile,
    SkipDelete,
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Else => write!(f, "else"),
            Self::EndIf => write!(f, "endif"),
            Self::Loop => write!(f, "loop"),
            Self::EndWhile => write!(f, "endWhile"),
            Self::SkipDelete => write!(f, "skipDelete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Add two registers into a register
    Add {
        target: Register,
        lhs: Register,
        rhs: Register,
    },
    /// Subtract two registers into a register
    Sub {
        target: Register,
        lhs: Register,
        rhs: Register,
    },
    /// Multiply two registers into `hi:lo`
    Mult {
        lhs: Register,
        rhs: Register,
        signed: bool,
    },
    /// Divide two registers: quotient in `lo`, remainder in `hi`
    Div {
        lhs: Register,
        rhs: Register,
        signed: bool,
    },
    /// Move from `hi`
    Mfhi(Register),
    /// Move from `lo`
    Mflo(Register),
    /// Load the word that follows into a register (and skip over it)
    Lis(Register),
    /// Load a register from memory
    Lw { register: Register, address: Memory },
    /// Store a register into memory
    Sw { register: Register, address: Memory },
    /// Set register 1 or 0 depending on `lhs < rhs`
    Slt {
        target: Register,
        lhs: Register,
        rhs: Register,
        signed: bool,
    },
    /// Branch if equal
    Beq {
        lhs: Register,
        rhs: Register,
        target: BranchTarget,
    },
    /// Branch if not equal
    Bne {
        lhs: Register,
        rhs: Register,
        target: BranchTarget,
    },
    /// Jump to the address in a register
    Jr(Register),
    /// Jump to the address in a register, linking into `$31`
    Jalr(Register),
}

fn unsigned_suffix(signed: bool) -> &'static str {
    if signed {
        ""
    } else {
        "u"
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Add { target, lhs, rhs } => write_instruction!(f, "add", target, lhs, rhs),
            Self::Sub { target, lhs, rhs } => write_instruction!(f, "sub", target, lhs, rhs),
            Self::Mult { lhs, rhs, signed } => write_instruction!(
                f,
                format!("mult{}", unsigned_suffix(*signed)),
                lhs,
                rhs
            ),
            Self::Div { lhs, rhs, signed } => write_instruction!(
                f,
                format!("div{}", unsigned_suffix(*signed)),
                lhs,
                rhs
            ),
            Self::Mfhi(register) => write_instruction!(f, "mfhi", register),
            Self::Mflo(register) => write_instruction!(f, "mflo", register),
            Self::Lis(register) => write_instruction!(f, "lis", register),
            Self::Lw { register, address } => write_instruction!(f, "lw", register, address),
            Self::Sw { register, address } => write_instruction!(f, "sw", register, address),
            Self::Slt {
                target,
                lhs,
                rhs,
                signed,
            } => write_instruction!(
                f,
                format!("slt{}", unsigned_suffix(*signed)),
                target,
                lhs,
                rhs
            ),
            Self::Beq { lhs, rhs, target } => write_instruction!(f, "beq", lhs, rhs, target),
            Self::Bne { lhs, rhs, target } => write_instruction!(f, "bne", lhs, rhs, target),
            Self::Jr(register) => write_instruction!(f, "jr", register),
            Self::Jalr(register) => write_instruction!(f, "jalr", register),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchTarget {
    Label(Label),
    /// Number of instructions to skip forward
    Skip(i32),
}

impl fmt::Display for BranchTarget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Label(label) => write!(f, "{}", label),
            Self::Skip(count) => write!(f, "{}", count),
        }
    }
}

#[macro_export]
macro_rules! format_instr_args {
    () => { "" };
    ($arg:expr) => { "{}" };
    ($first:expr, $($rest:expr),+) => {
        concat!("{}, ", $crate::format_instr_args!($($rest),+))
    }
}

#[macro_export]
macro_rules! format_instr {
    ($name:expr) => { format_args!("{}", $name) };
    ($name:expr, $($args:expr),+) => {
        format_args!(concat!("{} ", $crate::format_instr_args!($($args),+)), $name, $($args),+)
    };
}

#[macro_export]
macro_rules! write_instruction {
    ($formatter:expr, $name:expr) => {
        $formatter.write_fmt($crate::format_instr!($name))
    };
    ($formatter:expr, $name:expr, $($args:expr),+) => {
        $formatter.write_fmt($crate::format_instr!($name, $($args),+))
    };
}

/// Registers, numbered the way the assembler and the runtime library expect them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Register(u8);

impl Register {
    /// Always reads zero
    pub const ZERO: Self = Self(0);
    /// First argument of `wain` and of the runtime routines
    pub const ARG1: Self = Self(1);
    /// Second argument of `wain`
    pub const ARG2: Self = Self(2);
    /// Result of every expression
    pub const RESULT: Self = Self(3);
    /// Holds the constant 4
    pub const WORD_SIZE: Self = Self(4);
    /// Left operands, call addresses and constants
    pub const SCRATCH: Self = Self(5);
    pub const LESS: Self = Self(6);
    pub const GREATER: Self = Self(7);
    /// Holds the constant 1, which is also the value of `NULL`
    pub const NULL: Self = Self(11);
    pub const FRAME: Self = Self(29);
    pub const STACK: Self = Self(30);
    pub const RETURN_ADDRESS: Self = Self(31);
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Memory {
    pub register: Register,
    pub offset: i32,
}

impl Memory {
    pub const fn new(register: Register, offset: i32) -> Self {
        Self { register, offset }
    }
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}({})", self.offset, self.register)
    }
}
