//! Config-script execution.
//!
//! The dialect is a small line-oriented language: top-level `NAME = expr`
//! assignments, `#` comments, and `if expr:` headers followed by an
//! indented block. Expressions are scalar literals, references to names
//! assigned earlier in the same script, and `==`/`!=` comparisons.
//!
//! Executing a script produces a [`Namespace`] holding every assigned name,
//! lower-case included; upper-case filtering happens at extraction, not
//! here. Keeping execution behind this one entry point lets a restricted
//! variant of the dialect replace it without touching callers.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{alpha1, alphanumeric1, char, digit1, one_of, space0, space1},
    combinator::{eof, map, not, opt, recognize, rest, value as tagged},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated, tuple},
};

use super::Namespace;
use crate::error::ScriptError;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal(Value),
    Name(String),
    Compare {
        lhs: Box<Expr>,
        op: CmpOp,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
}

#[derive(Debug, Clone, PartialEq)]
enum Stmt {
    Assign {
        name: String,
        expr: Expr,
        line: usize,
    },
    If {
        cond: Expr,
        body: Vec<Stmt>,
        line: usize,
    },
}

/// One parsed source line, before block structure is assembled.
#[derive(Debug, Clone, PartialEq)]
enum Line {
    Assign(String, Expr),
    IfHeader(Expr),
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn number(input: &str) -> IResult<&str, Expr> {
    let (remaining, text) = recognize(tuple((
        opt(one_of("+-")),
        digit1,
        opt(preceded(char('.'), digit1)),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)?;
    let is_float = text.contains(['.', 'e', 'E']);
    let literal = if is_float {
        text.parse::<f64>().ok().map(Value::Float)
    } else {
        // Digit strings too large for i64 degrade to float, as the source
        // language would promote them.
        text.parse::<i64>()
            .ok()
            .map(Value::Int)
            .or_else(|| text.parse::<f64>().ok().map(Value::Float))
    };
    match literal {
        Some(value) => Ok((remaining, Expr::Literal(value))),
        None => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        ))),
    }
}

fn string_literal(input: &str) -> IResult<&str, Expr> {
    map(
        alt((
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
        )),
        |text: &str| Expr::Literal(Value::Str(text.to_string())),
    )(input)
}

fn name_or_keyword(input: &str) -> IResult<&str, Expr> {
    map(identifier, |name| match name {
        "True" => Expr::Literal(Value::Bool(true)),
        "False" => Expr::Literal(Value::Bool(false)),
        "None" => Expr::Literal(Value::None),
        _ => Expr::Name(name.to_string()),
    })(input)
}

fn atom(input: &str) -> IResult<&str, Expr> {
    alt((number, string_literal, name_or_keyword))(input)
}

fn cmp_op(input: &str) -> IResult<&str, CmpOp> {
    alt((tagged(CmpOp::Eq, tag("==")), tagged(CmpOp::Ne, tag("!="))))(input)
}

fn expr(input: &str) -> IResult<&str, Expr> {
    let (input, first) = atom(input)?;
    let (input, tail) = opt(tuple((delimited(space0, cmp_op, space0), atom)))(input)?;
    Ok((
        input,
        match tail {
            Some((op, rhs)) => Expr::Compare {
                lhs: Box::new(first),
                op,
                rhs: Box::new(rhs),
            },
            None => first,
        },
    ))
}

fn if_header(input: &str) -> IResult<&str, Line> {
    let (input, _) = terminated(tag("if"), space1)(input)?;
    let (input, cond) = expr(input)?;
    let (input, _) = preceded(space0, char(':'))(input)?;
    Ok((input, Line::IfHeader(cond)))
}

fn assignment(input: &str) -> IResult<&str, Line> {
    let (input, name) = identifier(input)?;
    // A single `=`; `==` would make this a bare comparison, which the
    // dialect does not allow as a statement.
    let (input, _) = delimited(space0, terminated(char('='), not(char('='))), space0)(input)?;
    let (input, value) = expr(input)?;
    Ok((input, Line::Assign(name.to_string(), value)))
}

fn line_end(input: &str) -> IResult<&str, ()> {
    let (input, _) = space0(input)?;
    let (input, _) = opt(preceded(char('#'), rest))(input)?;
    let (input, _) = eof(input)?;
    Ok((input, ()))
}

fn statement_line(input: &str) -> IResult<&str, Line> {
    terminated(alt((if_header, assignment)), line_end)(input)
}

fn parse_line(content: &str, line: usize) -> Result<Line, ScriptError> {
    match statement_line(content) {
        Ok((_, parsed)) => Ok(parsed),
        Err(_) => Err(ScriptError::Syntax {
            line,
            message: format!("invalid statement: {}", content.trim()),
        }),
    }
}

/// (1-based line number, indent width, statement text)
type SourceLine<'a> = (usize, usize, &'a str);

fn significant_lines(source: &str) -> Vec<SourceLine<'_>> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let trimmed = raw.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }
            let indent = raw.len() - trimmed.len();
            Some((index + 1, indent, trimmed))
        })
        .collect()
}

fn parse_block(
    lines: &[SourceLine<'_>],
    pos: &mut usize,
    indent: usize,
) -> Result<Vec<Stmt>, ScriptError> {
    let mut stmts = Vec::new();
    while *pos < lines.len() {
        let (line, line_indent, content) = lines[*pos];
        if line_indent < indent {
            break;
        }
        if line_indent > indent {
            return Err(ScriptError::Syntax {
                line,
                message: "unexpected indent".to_string(),
            });
        }
        match parse_line(content, line)? {
            Line::Assign(name, expr) => {
                stmts.push(Stmt::Assign { name, expr, line });
                *pos += 1;
            }
            Line::IfHeader(cond) => {
                *pos += 1;
                let body_indent = match lines.get(*pos) {
                    Some((_, next_indent, _)) if *next_indent > indent => *next_indent,
                    _ => {
                        return Err(ScriptError::Syntax {
                            line,
                            message: "expected an indented block".to_string(),
                        });
                    }
                };
                let body = parse_block(lines, pos, body_indent)?;
                stmts.push(Stmt::If { cond, body, line });
            }
        }
    }
    Ok(stmts)
}

fn parse_source(source: &str) -> Result<Vec<Stmt>, ScriptError> {
    let lines = significant_lines(source);
    let mut pos = 0;
    let stmts = parse_block(&lines, &mut pos, 0)?;
    if pos < lines.len() {
        // Only a dedent below column zero can leave input behind.
        let (line, ..) = lines[pos];
        return Err(ScriptError::Syntax {
            line,
            message: "unexpected dedent".to_string(),
        });
    }
    Ok(stmts)
}

fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
        (Value::Bool(a), Value::Int(b)) | (Value::Int(b), Value::Bool(a)) => i64::from(*a) == *b,
        _ => lhs == rhs,
    }
}

fn eval_expr(expr: &Expr, namespace: &Namespace, line: usize) -> Result<Value, ScriptError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Name(name) => namespace
            .get(name)
            .cloned()
            .ok_or_else(|| ScriptError::UndefinedName {
                name: name.clone(),
                line,
            }),
        Expr::Compare { lhs, op, rhs } => {
            let lhs = eval_expr(lhs, namespace, line)?;
            let rhs = eval_expr(rhs, namespace, line)?;
            let equal = values_equal(&lhs, &rhs);
            Ok(Value::Bool(match op {
                CmpOp::Eq => equal,
                CmpOp::Ne => !equal,
            }))
        }
    }
}

fn eval_block(stmts: &[Stmt], namespace: &mut Namespace) -> Result<(), ScriptError> {
    for stmt in stmts {
        match stmt {
            Stmt::Assign { name, expr, line } => {
                let value = eval_expr(expr, namespace, *line)?;
                namespace.set(name.clone(), value);
            }
            Stmt::If { cond, body, line } => {
                if eval_expr(cond, namespace, *line)?.is_truthy() {
                    eval_block(body, namespace)?;
                }
            }
        }
    }
    Ok(())
}

/// Execute `source` as a config script into a fresh namespace named `name`.
pub(super) fn eval_source(name: &str, source: &str) -> Result<Namespace, ScriptError> {
    let stmts = parse_source(source)?;
    let mut namespace = Namespace::new(name);
    eval_block(&stmts, &mut namespace)?;
    Ok(namespace)
}
