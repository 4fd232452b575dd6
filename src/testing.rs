//! Builders for derivation listings, so tests can be written close to the source they stand for.
//!
//! Every builder returns the lines of one subtree (no trailing newline), in the depth-first order
//! the tree builder consumes them.
use crate::compiler::Compilation;
use crate::{compile, CompileOptions};

pub enum Init {
    Num(i32),
    Null,
}

fn lines(parts: &[String]) -> String {
    parts.join("\n")
}

pub fn program(procedures: &[String], main: String) -> String {
    let mut list = format!("procedures main\n{main}");
    for procedure in procedures.iter().rev() {
        list = format!("procedures procedure procedures\n{procedure}\n{list}");
    }
    format!("start BOF procedures EOF\nBOF BOF\n{list}\nEOF EOF")
}

pub fn main_fn(
    first: String,
    second: String,
    declarations: &[(String, Init)],
    statements: &[String],
    ret: String,
) -> String {
    lines(&[
        "main INT WAIN LPAREN dcl COMMA dcl RPAREN LBRACE dcls statements RETURN expr SEMI RBRACE"
            .to_string(),
        "INT int".to_string(),
        "WAIN wain".to_string(),
        "LPAREN (".to_string(),
        first,
        "COMMA ,".to_string(),
        second,
        "RPAREN )".to_string(),
        "LBRACE {".to_string(),
        dcls(declarations),
        stmts(statements),
        "RETURN return".to_string(),
        ret,
        "SEMI ;".to_string(),
        "RBRACE }".to_string(),
    ])
}

/// `int wain(int a, int b)` with the given body, as a whole program.
pub fn wain_ints(declarations: &[(String, Init)], statements: &[String], ret: String) -> String {
    program(
        &[],
        main_fn(dcl("int", "a"), dcl("int", "b"), declarations, statements, ret),
    )
}

pub fn procedure(
    name: &str,
    params: &[String],
    declarations: &[(String, Init)],
    statements: &[String],
    ret: String,
) -> String {
    let params = if params.is_empty() {
        "params".to_string()
    } else {
        format!("params paramlist\n{}", paramlist(params))
    };
    lines(&[
        "procedure INT ID LPAREN params RPAREN LBRACE dcls statements RETURN expr SEMI RBRACE"
            .to_string(),
        "INT int".to_string(),
        format!("ID {name}"),
        "LPAREN (".to_string(),
        params,
        "RPAREN )".to_string(),
        "LBRACE {".to_string(),
        dcls(declarations),
        stmts(statements),
        "RETURN return".to_string(),
        ret,
        "SEMI ;".to_string(),
        "RBRACE }".to_string(),
    ])
}

fn paramlist(params: &[String]) -> String {
    match params {
        [] => unreachable!("paramlist needs at least one declaration"),
        [last] => format!("paramlist dcl\n{last}"),
        [first, rest @ ..] => format!(
            "paramlist dcl COMMA paramlist\n{first}\nCOMMA ,\n{}",
            paramlist(rest)
        ),
    }
}

fn arglist(args: &[String]) -> String {
    match args {
        [] => unreachable!("arglist needs at least one expression"),
        [last] => format!("arglist expr\n{last}"),
        [first, rest @ ..] => format!(
            "arglist expr COMMA arglist\n{first}\nCOMMA ,\n{}",
            arglist(rest)
        ),
    }
}

/// `ty` is either `int` or `int*`.
pub fn dcl(ty: &str, name: &str) -> String {
    let ty = match ty {
        "int" => "type INT\nINT int",
        "int*" => "type INT STAR\nINT int\nSTAR *",
        other => unreachable!("not a type: {other}"),
    };
    format!("dcl type ID\n{ty}\nID {name}")
}

pub fn dcls(declarations: &[(String, Init)]) -> String {
    // the last declaration heads the outermost production
    let mut out = Vec::with_capacity(declarations.len() * 6 + 1);
    for (_, init) in declarations.iter().rev() {
        out.push(format!("dcls dcls dcl BECOMES {} SEMI", init_symbol(init)));
    }
    out.push("dcls".to_string());
    for (declaration, init) in declarations {
        let lexeme = match init {
            Init::Num(n) => n.to_string(),
            Init::Null => "NULL".to_string(),
        };
        out.push(declaration.clone());
        out.push("BECOMES =".to_string());
        out.push(format!("{} {lexeme}", init_symbol(init)));
        out.push("SEMI ;".to_string());
    }
    lines(&out)
}

fn init_symbol(init: &Init) -> &'static str {
    match init {
        Init::Num(_) => "NUM",
        Init::Null => "NULL",
    }
}

pub fn stmts(statements: &[String]) -> String {
    let mut out = Vec::with_capacity(statements.len() * 2 + 1);
    out.extend(
        std::iter::repeat("statements statements statement".to_string()).take(statements.len()),
    );
    out.push("statements".to_string());
    out.extend(statements.iter().cloned());
    lines(&out)
}

pub fn assign(target: String, value: String) -> String {
    format!("statement lvalue BECOMES expr SEMI\n{target}\nBECOMES =\n{value}\nSEMI ;")
}

pub fn if_else(test: String, then: &[String], otherwise: &[String]) -> String {
    lines(&[
        "statement IF LPAREN test RPAREN LBRACE statements RBRACE ELSE LBRACE statements RBRACE"
            .to_string(),
        "IF if".to_string(),
        "LPAREN (".to_string(),
        test,
        "RPAREN )".to_string(),
        "LBRACE {".to_string(),
        stmts(then),
        "RBRACE }".to_string(),
        "ELSE else".to_string(),
        "LBRACE {".to_string(),
        stmts(otherwise),
        "RBRACE }".to_string(),
    ])
}

pub fn while_loop(test: String, body: &[String]) -> String {
    lines(&[
        "statement WHILE LPAREN test RPAREN LBRACE statements RBRACE".to_string(),
        "WHILE while".to_string(),
        "LPAREN (".to_string(),
        test,
        "RPAREN )".to_string(),
        "LBRACE {".to_string(),
        stmts(body),
        "RBRACE }".to_string(),
    ])
}

pub fn println(value: String) -> String {
    format!(
        "statement PRINTLN LPAREN expr RPAREN SEMI\n\
         PRINTLN println\nLPAREN (\n{value}\nRPAREN )\nSEMI ;"
    )
}

pub fn delete(value: String) -> String {
    format!(
        "statement DELETE LBRACK RBRACK expr SEMI\n\
         DELETE delete\nLBRACK [\nRBRACK ]\n{value}\nSEMI ;"
    )
}

/// `op` is one of `EQ`, `NE`, `LT`, `LE`, `GT`, `GE`.
pub fn test(lhs: String, op: &str, rhs: String) -> String {
    format!("test expr {op} expr\n{lhs}\n{op} {op}\n{rhs}")
}

/// `op` is `PLUS` or `MINUS`; `rhs` must be a term.
pub fn e_op(lhs: String, op: &str, rhs: String) -> String {
    format!("expr expr {op} term\n{lhs}\n{op} {op}\n{rhs}")
}

/// `op` is `STAR`, `SLASH` or `PCT`; `rhs` must be a factor.
pub fn t_op(lhs: String, op: &str, rhs: String) -> String {
    format!("term term {op} factor\n{lhs}\n{op} {op}\n{rhs}")
}

/// Expression made of a single term.
pub fn et(term: String) -> String {
    format!("expr term\n{term}")
}

/// Term made of a single factor.
pub fn tf(factor: String) -> String {
    format!("term factor\n{factor}")
}

/// Expression made of a single factor.
pub fn ef(factor: String) -> String {
    et(tf(factor))
}

pub fn var(name: &str) -> String {
    ef(f_id(name))
}

pub fn num(n: i32) -> String {
    ef(f_num(n))
}

pub fn f_id(name: &str) -> String {
    format!("factor ID\nID {name}")
}

pub fn f_num(n: i32) -> String {
    f_num_text(&n.to_string())
}

pub fn f_num_text(text: &str) -> String {
    format!("factor NUM\nNUM {text}")
}

pub fn f_null() -> String {
    "factor NULL\nNULL NULL".to_string()
}

pub fn f_paren(expr: String) -> String {
    format!("factor LPAREN expr RPAREN\nLPAREN (\n{expr}\nRPAREN )")
}

pub fn f_amp(lvalue: String) -> String {
    format!("factor AMP lvalue\nAMP &\n{lvalue}")
}

pub fn f_deref(factor: String) -> String {
    format!("factor STAR factor\nSTAR *\n{factor}")
}

pub fn f_new(size: String) -> String {
    format!("factor NEW INT LBRACK expr RBRACK\nNEW new\nINT int\nLBRACK [\n{size}\nRBRACK ]")
}

pub fn f_call(name: &str, args: &[String]) -> String {
    if args.is_empty() {
        format!("factor ID LPAREN RPAREN\nID {name}\nLPAREN (\nRPAREN )")
    } else {
        format!(
            "factor ID LPAREN arglist RPAREN\nID {name}\nLPAREN (\n{}\nRPAREN )",
            arglist(args)
        )
    }
}

pub fn lv_id(name: &str) -> String {
    format!("lvalue ID\nID {name}")
}

pub fn lv_deref(factor: String) -> String {
    format!("lvalue STAR factor\nSTAR *\n{factor}")
}

pub fn lv_paren(lvalue: String) -> String {
    format!("lvalue LPAREN lvalue RPAREN\nLPAREN (\n{lvalue}\nRPAREN )")
}

/// Whether `needle` appears as consecutive lines of `haystack`.
pub fn contains_run(haystack: &[String], needle: &[&str]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window.iter().zip(needle).all(|(a, b)| a == b))
}

pub fn compile_listing(listing: &str) -> anyhow::Result<Compilation> {
    Ok(compile(listing, CompileOptions::default())?)
}
