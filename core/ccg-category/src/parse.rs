//! Category string grammar.
//!
//! ```text
//! CAT     := OPERAND (SLASH OPERAND)?
//! OPERAND := ATOM | '(' CAT ')'
//! ATOM    := NAME ('[' FEATURE ']')*
//! ```
//!
//! A category has at most one top-level slash. Complex operands must be
//! bracketed, as in CCGbank, so a chain like `S/NP/NP` is a parse error
//! rather than a left-associated `(S/NP)/NP`.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::char,
    combinator::{all_consuming, consumed, map, opt, recognize, value},
    multi::many0,
    sequence::{delimited, pair},
    IResult,
};

use ccg_protocol::Slash;

use crate::error::CategoryError;

/// Suffix the chart appends to a conjunct's category.
pub const CONJ_FEATURE: &str = "[conj]";

/// Syntax tree of a category string. Every node borrows the exact text it
/// was parsed from, without enclosing operand brackets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CatExpr<'a> {
    Atom(&'a str),
    Complex {
        text: &'a str,
        result: Box<CatExpr<'a>>,
        slash: Slash,
        argument: Box<CatExpr<'a>>,
    },
}

impl<'a> CatExpr<'a> {
    pub(crate) fn text(&self) -> &'a str {
        match self {
            CatExpr::Atom(text) => text,
            CatExpr::Complex { text, .. } => text,
        }
    }
}

fn is_name_char(c: char) -> bool {
    !matches!(c, '(' | ')' | '[' | ']' | '/' | '\\') && !c.is_whitespace()
}

fn slash(input: &str) -> IResult<&str, Slash> {
    alt((
        value(Slash::Forward, char('/')),
        value(Slash::Backward, char('\\')),
    ))(input)
}

fn feature(input: &str) -> IResult<&str, &str> {
    delimited(char('['), take_while1(|c| c != '[' && c != ']'), char(']'))(input)
}

fn atom(input: &str) -> IResult<&str, CatExpr<'_>> {
    map(
        recognize(pair(take_while1(is_name_char), many0(feature))),
        CatExpr::Atom,
    )(input)
}

fn operand(input: &str) -> IResult<&str, CatExpr<'_>> {
    alt((delimited(char('('), category, char(')')), atom))(input)
}

fn category(input: &str) -> IResult<&str, CatExpr<'_>> {
    let (rest, (text, (first, tail))) = consumed(pair(operand, opt(pair(slash, operand))))(input)?;
    let expr = match tail {
        None => first,
        Some((slash, second)) => CatExpr::Complex {
            text,
            result: Box::new(first),
            slash,
            argument: Box::new(second),
        },
    };
    Ok((rest, expr))
}

/// Parses a whole category string (without any `[conj]` suffix).
pub(crate) fn parse_expr(input: &str) -> Result<CatExpr<'_>, CategoryError> {
    if input.is_empty() {
        return Err(CategoryError::EmptyCategory);
    }
    match all_consuming(category)(input) {
        Ok((_, expr)) => Ok(expr),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(CategoryError::Parse {
            input: input.to_owned(),
            reason: format!(
                "unexpected input at byte {} ({:?})",
                input.len() - e.input.len(),
                e.code
            ),
        }),
        Err(nom::Err::Incomplete(_)) => Err(CategoryError::Parse {
            input: input.to_owned(),
            reason: "incomplete input".to_owned(),
        }),
    }
}

/// Removes a trailing `[conj]`.
pub fn strip_conj(s: &str) -> &str {
    s.strip_suffix(CONJ_FEATURE).unwrap_or(s)
}

/// The category string with every bracketed feature removed.
pub fn no_features(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut depth = 0usize;
    for c in s.chars() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

pub fn has_features(s: &str) -> bool {
    s.contains('[')
}

fn join(result: &str, slash: Slash, argument: &str) -> String {
    let operand = |s: &str| {
        if s.contains('/') || s.contains('\\') {
            format!("({s})")
        } else {
            s.to_owned()
        }
    };
    format!("{}{}{}", operand(result), slash.symbol(), operand(argument))
}

/// `result/argument`, bracketing complex operands.
pub fn forward(result: &str, argument: &str) -> String {
    join(result, Slash::Forward, argument)
}

/// `result\argument`, bracketing complex operands.
pub fn backward(result: &str, argument: &str) -> String {
    join(result, Slash::Backward, argument)
}

pub fn with_slash(result: &str, slash: Slash, argument: &str) -> String {
    join(result, slash, argument)
}
