//! Reads the typed [`ast`](crate::ast) out of a [`SyntaxNode`] tree.
//!
//! Each production is matched on the symbols of its right-hand side; a node whose shape matches
//! no production of the grammar is rejected here, so later stages only ever see well-formed
//! programs.
use crate::ast::*;
use crate::error;
use crate::tree::SyntaxNode;
use thiserror::Error;

pub type ShapeError = error::Error<ShapeErrorKind>;
pub type ShapeRes<T> = Result<T, ShapeError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeErrorKind {
    #[error("expected a `{expected}` node, but found `{found}`")]
    WrongSymbol {
        expected: &'static str,
        found: String,
    },
    #[error("no production derives `{symbol} -> {}`", .rhs.join(" "))]
    UnknownProduction { symbol: String, rhs: Vec<String> },
    #[error("terminal `{0}` carries no lexeme")]
    MissingLexeme(String),
    #[error("`{0}` is not an unsigned decimal literal that fits in 32 bits")]
    BadNumber(String),
}

pub trait Parse: Sized {
    fn parse(node: &SyntaxNode) -> ShapeRes<Self>;
}

pub fn parse<T>(node: &SyntaxNode) -> ShapeRes<T>
where
    T: Parse,
{
    T::parse(node)
}

fn with_context<F, T>(context: &'static str, cont: F) -> ShapeRes<T>
where
    F: FnOnce() -> ShapeRes<T>,
{
    cont().map_err(|x| x.add_context(context))
}

/// Checks the node's symbol and hands back the right-hand side it was derived with.
fn production<'n>(node: &'n SyntaxNode, symbol: &'static str) -> ShapeRes<Vec<&'n str>> {
    if node.symbol() != symbol {
        return Err(ShapeError::new(ShapeErrorKind::WrongSymbol {
            expected: symbol,
            found: node.symbol().to_string(),
        })
        .with_line(node.line()));
    }
    Ok(node.rhs())
}

fn unknown<T>(node: &SyntaxNode) -> ShapeRes<T> {
    Err(ShapeError::new(ShapeErrorKind::UnknownProduction {
        symbol: node.symbol().to_string(),
        rhs: node.rhs().into_iter().map(String::from).collect(),
    })
    .with_line(node.line()))
}

fn lexeme(node: &SyntaxNode) -> ShapeRes<&str> {
    node.lexeme().ok_or_else(|| {
        ShapeError::new(ShapeErrorKind::MissingLexeme(node.symbol().to_string()))
            .with_line(node.line())
    })
}

fn identifier(node: &SyntaxNode) -> ShapeRes<String> {
    production(node, "ID")?;
    lexeme(node).map(String::from)
}

fn number(node: &SyntaxNode) -> ShapeRes<i32> {
    production(node, "NUM")?;
    let text = lexeme(node)?;
    let bad = || {
        ShapeError::new(ShapeErrorKind::BadNumber(text.to_string())).with_line(node.line())
    };
    // a NUM token is digits only; `str::parse` would also take a sign
    if !text.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(bad());
    }
    text.parse().map_err(|_| bad())
}

impl Parse for Program {
    fn parse(node: &SyntaxNode) -> ShapeRes<Self> {
        with_context("reading the program", || {
            match production(node, "start")?.as_slice() {
                ["BOF", "procedures", "EOF"] => {
                    let mut procedures = Vec::new();
                    let mut list = &node.children()[1];
                    loop {
                        match production(list, "procedures")?.as_slice() {
                            ["procedure", "procedures"] => {
                                procedures.push(parse(&list.children()[0])?);
                                list = &list.children()[1];
                            }
                            ["main"] => {
                                let main = parse(&list.children()[0])?;
                                return Ok(Self { procedures, main });
                            }
                            _ => return unknown(list),
                        }
                    }
                }
                _ => unknown(node),
            }
        })
    }
}

impl Parse for Procedure {
    fn parse(node: &SyntaxNode) -> ShapeRes<Self> {
        with_context("reading a procedure", || {
            match production(node, "procedure")?.as_slice() {
                [
                    "INT", "ID", "LPAREN", "params", "RPAREN", "LBRACE", "dcls", "statements",
                    "RETURN", "expr", "SEMI", "RBRACE",
                ] => {
                    let c = node.children();
                    Ok(Self {
                        name: Identifier(identifier(&c[1])?),
                        params: parse_params(&c[3])?,
                        body: Body {
                            declarations: parse_dcls(&c[6])?,
                            statements: parse_statements(&c[7])?,
                            return_expr: parse(&c[9])?,
                        },
                    })
                }
                _ => unknown(node),
            }
        })
    }
}

impl Parse for Main {
    fn parse(node: &SyntaxNode) -> ShapeRes<Self> {
        with_context("reading wain", || {
            match production(node, "main")?.as_slice() {
                [
                    "INT", "WAIN", "LPAREN", "dcl", "COMMA", "dcl", "RPAREN", "LBRACE", "dcls",
                    "statements", "RETURN", "expr", "SEMI", "RBRACE",
                ] => {
                    let c = node.children();
                    Ok(Self {
                        first: parse(&c[3])?,
                        second: parse(&c[5])?,
                        body: Body {
                            declarations: parse_dcls(&c[8])?,
                            statements: parse_statements(&c[9])?,
                            return_expr: parse(&c[11])?,
                        },
                    })
                }
                _ => unknown(node),
            }
        })
    }
}

fn parse_params(node: &SyntaxNode) -> ShapeRes<Vec<Declaration>> {
    with_context("reading parameters", || {
        let mut params = Vec::new();
        let mut list = match production(node, "params")?.as_slice() {
            [] => return Ok(params),
            ["paramlist"] => &node.children()[0],
            _ => return unknown(node),
        };
        loop {
            match production(list, "paramlist")?.as_slice() {
                ["dcl"] => {
                    params.push(parse(&list.children()[0])?);
                    return Ok(params);
                }
                ["dcl", "COMMA", "paramlist"] => {
                    params.push(parse(&list.children()[0])?);
                    list = &list.children()[2];
                }
                _ => return unknown(list),
            }
        }
    })
}

// dcls and statements are left recursive: the innermost list holds the first item.
fn parse_dcls(node: &SyntaxNode) -> ShapeRes<Vec<InitializedDeclaration>> {
    with_context("reading declarations", || {
        let mut declarations = Vec::new();
        let mut list = node;
        loop {
            let init = match production(list, "dcls")?.as_slice() {
                [] => break,
                ["dcls", "dcl", "BECOMES", "NUM", "SEMI"] => {
                    Initializer::Number(number(&list.children()[3])?)
                }
                ["dcls", "dcl", "BECOMES", "NULL", "SEMI"] => Initializer::Null,
                _ => return unknown(list),
            };
            declarations.push(InitializedDeclaration {
                declaration: parse(&list.children()[1])?,
                init,
            });
            list = &list.children()[0];
        }
        declarations.reverse();
        Ok(declarations)
    })
}

fn parse_statements(node: &SyntaxNode) -> ShapeRes<Vec<Statement>> {
    with_context("reading statements", || {
        let mut statements = Vec::new();
        let mut list = node;
        loop {
            match production(list, "statements")?.as_slice() {
                [] => break,
                ["statements", "statement"] => {
                    statements.push(parse(&list.children()[1])?);
                    list = &list.children()[0];
                }
                _ => return unknown(list),
            }
        }
        statements.reverse();
        Ok(statements)
    })
}

fn parse_arglist(node: &SyntaxNode) -> ShapeRes<Vec<Expr>> {
    with_context("reading arguments", || {
        let mut args = Vec::new();
        let mut list = node;
        loop {
            match production(list, "arglist")?.as_slice() {
                ["expr"] => {
                    args.push(parse(&list.children()[0])?);
                    return Ok(args);
                }
                ["expr", "COMMA", "arglist"] => {
                    args.push(parse(&list.children()[0])?);
                    list = &list.children()[2];
                }
                _ => return unknown(list),
            }
        }
    })
}

impl Parse for Declaration {
    fn parse(node: &SyntaxNode) -> ShapeRes<Self> {
        with_context("reading a declaration", || {
            match production(node, "dcl")?.as_slice() {
                ["type", "ID"] => Ok(Self {
                    ty: parse(&node.children()[0])?,
                    name: identifier(&node.children()[1])?,
                }),
                _ => unknown(node),
            }
        })
    }
}

impl Parse for Type {
    fn parse(node: &SyntaxNode) -> ShapeRes<Self> {
        match production(node, "type")?.as_slice() {
            ["INT"] => Ok(Self::Int),
            ["INT", "STAR"] => Ok(Self::IntPointer),
            _ => unknown(node),
        }
    }
}

impl Parse for Statement {
    fn parse(node: &SyntaxNode) -> ShapeRes<Self> {
        with_context("reading a statement", || {
            let c = node.children();
            match production(node, "statement")?.as_slice() {
                ["lvalue", "BECOMES", "expr", "SEMI"] => Ok(Self::Assign {
                    target: parse(&c[0])?,
                    value: parse(&c[2])?,
                }),
                [
                    "IF", "LPAREN", "test", "RPAREN", "LBRACE", "statements", "RBRACE", "ELSE",
                    "LBRACE", "statements", "RBRACE",
                ] => {
                    Ok(Self::If {
                        test: parse(&c[2])?,
                        then: parse_statements(&c[5])?,
                        otherwise: parse_statements(&c[9])?,
                    })
                }
                ["WHILE", "LPAREN", "test", "RPAREN", "LBRACE", "statements", "RBRACE"] => {
                    Ok(Self::While {
                        test: parse(&c[2])?,
                        body: parse_statements(&c[5])?,
                    })
                }
                ["PRINTLN", "LPAREN", "expr", "RPAREN", "SEMI"] => Ok(Self::Println(parse(&c[2])?)),
                ["DELETE", "LBRACK", "RBRACK", "expr", "SEMI"] => Ok(Self::Delete(parse(&c[3])?)),
                _ => unknown(node),
            }
        })
    }
}

impl Parse for Test {
    fn parse(node: &SyntaxNode) -> ShapeRes<Self> {
        with_context("reading a test", || {
            match production(node, "test")?.as_slice() {
                ["expr", op, "expr"] => match Comparison::from_symbol(op) {
                    Some(comparison) => Ok(Self {
                        comparison,
                        lhs: parse(&node.children()[0])?,
                        rhs: parse(&node.children()[2])?,
                    }),
                    None => unknown(node),
                },
                _ => unknown(node),
            }
        })
    }
}

impl Parse for Expr {
    fn parse(node: &SyntaxNode) -> ShapeRes<Self> {
        with_context("reading an expression", || {
            match production(node, "expr")?.as_slice() {
                ["term"] => Ok(Self::Term(parse(&node.children()[0])?)),
                ["expr", op, "term"] => match AdditiveOp::from_symbol(op) {
                    Some(operator) => Ok(Self::Binary {
                        operator,
                        lhs: Box::new(parse(&node.children()[0])?),
                        rhs: parse(&node.children()[2])?,
                    }),
                    None => unknown(node),
                },
                _ => unknown(node),
            }
        })
    }
}

impl Parse for Term {
    fn parse(node: &SyntaxNode) -> ShapeRes<Self> {
        match production(node, "term")?.as_slice() {
            ["factor"] => Ok(Self::Factor(parse(&node.children()[0])?)),
            ["term", op, "factor"] => match MultiplicativeOp::from_symbol(op) {
                Some(operator) => Ok(Self::Binary {
                    operator,
                    lhs: Box::new(parse(&node.children()[0])?),
                    rhs: parse(&node.children()[2])?,
                }),
                None => unknown(node),
            },
            _ => unknown(node),
        }
    }
}

impl Parse for Factor {
    fn parse(node: &SyntaxNode) -> ShapeRes<Self> {
        with_context("reading a factor", || {
            let c = node.children();
            match production(node, "factor")?.as_slice() {
                ["ID"] => Ok(Self::Variable(identifier(&c[0])?)),
                ["NUM"] => Ok(Self::Number(number(&c[0])?)),
                ["NULL"] => Ok(Self::Null),
                ["LPAREN", "expr", "RPAREN"] => Ok(Self::Parenthesized(Box::new(parse(&c[1])?))),
                ["AMP", "lvalue"] => Ok(Self::AddressOf(Box::new(parse(&c[1])?))),
                ["STAR", "factor"] => Ok(Self::Dereference(Box::new(parse(&c[1])?))),
                ["NEW", "INT", "LBRACK", "expr", "RBRACK"] => {
                    Ok(Self::New(Box::new(parse(&c[3])?)))
                }
                ["ID", "LPAREN", "RPAREN"] => Ok(Self::Call {
                    name: identifier(&c[0])?,
                    args: Vec::new(),
                }),
                ["ID", "LPAREN", "arglist", "RPAREN"] => Ok(Self::Call {
                    name: identifier(&c[0])?,
                    args: parse_arglist(&c[2])?,
                }),
                _ => unknown(node),
            }
        })
    }
}

impl Parse for LValue {
    fn parse(node: &SyntaxNode) -> ShapeRes<Self> {
        with_context("reading an lvalue", || {
            let c = node.children();
            match production(node, "lvalue")?.as_slice() {
                ["ID"] => Ok(Self::Variable(identifier(&c[0])?)),
                ["STAR", "factor"] => Ok(Self::Dereference(Box::new(parse(&c[1])?))),
                ["LPAREN", "lvalue", "RPAREN"] => Ok(Self::Parenthesized(Box::new(parse(&c[1])?))),
                _ => unknown(node),
            }
        })
    }
}
