//! Rebuilds the derivation tree from the parser's line-oriented listing.
//!
//! Every line names a grammar symbol. Terminals carry their lexeme on the same line; a
//! nonterminal line lists the right-hand side of the production used, and each of those symbols
//! is built from the following lines, depth first.
use crate::error;
use lazy_static::lazy_static;
use std::collections::HashSet;
use thiserror::Error;

lazy_static! {
    static ref TERMINALS: HashSet<&'static str> = [
        "BOF", "BECOMES", "COMMA", "ELSE", "EOF", "EQ", "GE", "GT", "ID", "IF", "INT", "LBRACE",
        "LE", "LPAREN", "LT", "MINUS", "NE", "NUM", "PCT", "PLUS", "PRINTLN", "RBRACE", "RETURN",
        "RPAREN", "SEMI", "SLASH", "STAR", "WAIN", "WHILE", "AMP", "LBRACK", "RBRACK", "NEW",
        "DELETE", "NULL",
    ]
    .into_iter()
    .collect();
}

pub fn is_terminal(symbol: &str) -> bool {
    TERMINALS.contains(symbol)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    symbol: String,
    /// 1-based line of the derivation this node was read from
    line: usize,
    kind: NodeKind,
}

// Left-recursive lists make the tree as deep as the program is long, so children are torn down
// from a worklist rather than by the default recursive drop.
impl Drop for SyntaxNode {
    fn drop(&mut self) {
        let mut pending = match &mut self.kind {
            NodeKind::Nonterminal { children } => std::mem::take(children),
            NodeKind::Terminal { .. } => return,
        };
        while let Some(mut node) = pending.pop() {
            if let NodeKind::Nonterminal { children } = &mut node.kind {
                pending.append(children);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Terminal { lexeme: String },
    Nonterminal { children: Vec<SyntaxNode> },
}

impl SyntaxNode {
    pub fn terminal(symbol: impl Into<String>, lexeme: impl Into<String>, line: usize) -> Self {
        Self {
            symbol: symbol.into(),
            line,
            kind: NodeKind::Terminal {
                lexeme: lexeme.into(),
            },
        }
    }
    pub fn nonterminal(symbol: impl Into<String>, children: Vec<SyntaxNode>, line: usize) -> Self {
        Self {
            symbol: symbol.into(),
            line,
            kind: NodeKind::Nonterminal { children },
        }
    }
    pub fn symbol(&self) -> &str {
        &self.symbol
    }
    pub const fn line(&self) -> usize {
        self.line
    }
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }
    /// Children of a nonterminal; terminals have none (their lexeme is not a node).
    pub fn children(&self) -> &[SyntaxNode] {
        match &self.kind {
            NodeKind::Nonterminal { children } => children,
            NodeKind::Terminal { .. } => &[],
        }
    }
    pub fn lexeme(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Terminal { lexeme } => Some(lexeme),
            NodeKind::Nonterminal { .. } => None,
        }
    }
    /// The right-hand side of the production this node was derived with.
    pub fn rhs(&self) -> Vec<&str> {
        self.children().iter().map(SyntaxNode::symbol).collect()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeErrorKind {
    #[error("the derivation is empty")]
    Empty,
    #[error("blank line in the derivation")]
    BlankLine,
    #[error("derivation ended after {built} of the {expected} children of `{symbol}`")]
    Truncated {
        symbol: String,
        built: usize,
        expected: usize,
    },
}

pub type TreeError = error::Error<TreeErrorKind>;
pub type TreeRes<T> = Result<T, TreeError>;

/// A nonterminal still waiting for some of its children.
struct OpenNode {
    symbol: String,
    line: usize,
    expected: usize,
    children: Vec<SyntaxNode>,
}

impl OpenNode {
    fn close(self) -> SyntaxNode {
        SyntaxNode::nonterminal(self.symbol, self.children, self.line)
    }
}

enum ReadLine {
    Complete(SyntaxNode),
    Open(OpenNode),
}

fn read_line(line_number: usize, line: &str) -> TreeRes<ReadLine> {
    let mut words = line.split_whitespace();
    let symbol = words
        .next()
        .ok_or_else(|| TreeError::new(TreeErrorKind::BlankLine).with_line(line_number))?
        .to_string();

    if is_terminal(&symbol) {
        let lexeme = words.last().unwrap_or_default();
        tracing::trace!(target: "tree", "{line_number}: terminal {symbol} {lexeme:?}");
        return Ok(ReadLine::Complete(SyntaxNode::terminal(
            symbol,
            lexeme,
            line_number,
        )));
    }

    let expected = words.count();
    tracing::trace!(target: "tree", "{line_number}: {symbol} with {expected} children");
    if expected == 0 {
        return Ok(ReadLine::Complete(SyntaxNode::nonterminal(
            symbol,
            Vec::new(),
            line_number,
        )));
    }
    Ok(ReadLine::Open(OpenNode {
        symbol,
        line: line_number,
        expected,
        children: Vec::with_capacity(expected),
    }))
}

/// Consumes one derivation line per node it builds.
///
/// Lists in the grammar nest one level per item, so the nonterminals still being built are kept
/// on an explicit stack instead of the call stack.
pub struct TreeBuilder<I>
where
    I: Iterator,
{
    lines: std::iter::Enumerate<I>,
}

impl<I, S> TreeBuilder<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines: lines.enumerate(),
        }
    }

    pub fn build(mut self) -> TreeRes<SyntaxNode> {
        let mut open: Vec<OpenNode> = Vec::new();
        let root = 'lines: loop {
            let (index, line) = match self.lines.next() {
                Some(next) => next,
                None => {
                    return Err(match open.pop() {
                        Some(parent) => TreeError::new(TreeErrorKind::Truncated {
                            built: parent.children.len(),
                            expected: parent.expected,
                            symbol: parent.symbol,
                        })
                        .with_line(parent.line),
                        None => TreeError::new(TreeErrorKind::Empty),
                    })
                }
            };
            let mut node = match read_line(index + 1, line.as_ref())? {
                ReadLine::Complete(node) => node,
                ReadLine::Open(parent) => {
                    open.push(parent);
                    continue;
                }
            };
            while let Some(mut parent) = open.pop() {
                parent.children.push(node);
                if parent.children.len() < parent.expected {
                    open.push(parent);
                    continue 'lines;
                }
                node = parent.close();
            }
            break node;
        };

        let leftover = self.lines.count();
        if leftover != 0 {
            tracing::warn!(
                target: "tree",
                "ignoring {leftover} line(s) after the root `{}`",
                root.symbol()
            );
        }
        Ok(root)
    }
}

pub fn build_tree<I, S>(lines: I) -> TreeRes<SyntaxNode>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    TreeBuilder::new(lines).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_children_depth_first() {
        let derivation = "\
expr expr PLUS term
expr term
term factor
factor NUM
NUM 1
PLUS +
term factor
factor ID
ID x";
        let tree = build_tree(derivation.lines()).unwrap();
        assert_eq!(tree.rhs(), ["expr", "PLUS", "term"]);
        let lhs = &tree.children()[0];
        assert_eq!(lhs.rhs(), ["term"]);
        assert_eq!(lhs.line(), 2);
        let number = &lhs.children()[0].children()[0].children()[0];
        assert_eq!(number.symbol(), "NUM");
        assert_eq!(number.lexeme(), Some("1"));
        assert_eq!(tree.children()[1].lexeme(), Some("+"));
        let id = &tree.children()[2].children()[0].children()[0];
        assert_eq!((id.lexeme(), id.line()), (Some("x"), 9));
    }

    #[test]
    fn empty_productions_have_no_children() {
        let tree = build_tree(["dcls"].into_iter()).unwrap();
        assert!(tree.children().is_empty());
        assert_eq!(tree.lexeme(), None);
    }

    #[test]
    fn terminal_lexeme_is_single_leaf() {
        let tree = build_tree(["BOF BOF"].into_iter()).unwrap();
        assert_eq!(
            tree.kind(),
            &NodeKind::Terminal {
                lexeme: "BOF".to_string()
            }
        );
    }

    #[test]
    fn truncated_derivation_is_an_error() {
        let err = build_tree("term term STAR factor\nterm factor\nfactor NUM\nNUM 2".lines())
            .unwrap_err();
        assert_eq!(
            err.kind,
            TreeErrorKind::Truncated {
                symbol: "term".to_string(),
                built: 1,
                expected: 3,
            }
        );
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn blank_and_empty_input() {
        assert_eq!(
            build_tree(std::iter::empty::<&str>()).unwrap_err().kind,
            TreeErrorKind::Empty
        );
        let err = build_tree(["lvalue ID", "   "].into_iter()).unwrap_err();
        assert_eq!(err.kind, TreeErrorKind::BlankLine);
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn lines_after_the_root_are_ignored() {
        let tree = build_tree(["BOF BOF", "EOF EOF", "ID x"].into_iter()).unwrap();
        assert_eq!(tree.symbol(), "BOF");
        assert_eq!(tree.lexeme(), Some("BOF"));
        assert_eq!(tree.line(), 1);

        let tree = build_tree("factor ID\nID x\nfactor NUM".lines()).unwrap();
        assert_eq!(tree.rhs(), ["ID"]);
    }

    #[test]
    fn long_statement_lists_do_not_exhaust_the_stack() {
        const COUNT: usize = 100_000;
        let mut derivation = Vec::with_capacity(COUNT * 2 + 1);
        derivation.extend(std::iter::repeat("statements statements statement").take(COUNT));
        derivation.push("statements");
        derivation.extend(std::iter::repeat("statement").take(COUNT));

        let tree = build_tree(derivation.into_iter()).unwrap();
        let mut depth = 0;
        let mut node = &tree;
        while let [rest, statement] = node.children() {
            assert_eq!(statement.symbol(), "statement");
            depth += 1;
            node = rest;
        }
        assert_eq!(depth, COUNT);
        assert!(node.children().is_empty());
        assert_eq!(node.line(), COUNT + 1);
    }
}
