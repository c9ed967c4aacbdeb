use winnow::ascii::{digit1, multispace0, Caseless};
use winnow::combinator::{alt, cut_err, delimited, not, opt, preceded, repeat, separated, terminated};
use winnow::error::{ContextError, ErrMode, ModalResult, ParserError, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_while};

use crate::types::{CompareOp, ComparisonOptions, Literal};

use super::ast::{Compare, Expr, Operand, Quantifier};

// -- Whitespace & keywords --------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    multispace0.void().parse_next(input)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A case-insensitive reserved word that does not run into an identifier.
fn keyword<'i>(word: &'static str) -> impl Parser<&'i str, &'i str, ErrMode<ContextError>> {
    terminated(Caseless(word), not(one_of(is_ident_char)))
}

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., is_ident_char),
    )
        .take()
        .parse_next(input)
}

fn key_path(input: &mut &str) -> ModalResult<Vec<String>> {
    separated(1.., ident.map(str::to_owned), '.').parse_next(input)
}

// -- Literals ---------------------------------------------------------------

fn string_literal(input: &mut &str) -> ModalResult<String> {
    let quote = one_of(['"', '\'']).parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = cut_err(any).parse_next(input)?;
        match ch {
            c if c == quote => return Ok(s),
            '\\' => {
                let esc = cut_err(any).parse_next(input)?;
                match esc {
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    other => s.push(other),
                }
            }
            c => s.push(c),
        }
    }
}

fn number(input: &mut &str) -> ModalResult<Literal> {
    let text = (
        opt('-'),
        digit1,
        opt(('.', digit1)),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .take()
        .parse_next(input)?;
    if !text.contains(['.', 'e', 'E']) {
        if let Ok(int) = text.parse::<i64>() {
            return Ok(Literal::Int(int));
        }
    }
    // out-of-range integers fall back to floats
    text.parse::<f64>()
        .map(Literal::Float)
        .map_err(|_| ErrMode::from_input(input).cut())
}

/// `NaN`, `inf` and `-inf`, as floats render when they are not finite.
fn non_finite(input: &mut &str) -> ModalResult<Literal> {
    alt((
        keyword("NaN").value(Literal::Float(f64::NAN)),
        keyword("inf").value(Literal::Float(f64::INFINITY)),
        preceded('-', keyword("inf")).value(Literal::Float(f64::NEG_INFINITY)),
    ))
    .parse_next(input)
}

fn list(input: &mut &str) -> ModalResult<Literal> {
    delimited(
        '{',
        separated(0.., literal, (ws, ',')),
        (ws, cut_err('}')),
    )
    .map(Literal::List)
    .parse_next(input)
}

fn literal(input: &mut &str) -> ModalResult<Literal> {
    ws.parse_next(input)?;
    alt((
        list,
        string_literal.map(Literal::String),
        number,
        non_finite,
        alt((keyword("nil"), keyword("null"))).value(Literal::Nil),
        alt((keyword("true"), keyword("yes"))).value(Literal::Bool(true)),
        alt((keyword("false"), keyword("no"))).value(Literal::Bool(false)),
    ))
    .context(StrContext::Expected(StrContextValue::Description("literal")))
    .parse_next(input)
}

// -- Comparisons ------------------------------------------------------------

fn compare_op(input: &mut &str) -> ModalResult<CompareOp> {
    alt((
        alt((
            "==".value(CompareOp::Eq),
            "=<".value(CompareOp::Lte),
            "=>".value(CompareOp::Gte),
            "=".value(CompareOp::Eq),
            "!=".value(CompareOp::Neq),
            "<>".value(CompareOp::Neq),
            "<=".value(CompareOp::Lte),
            ">=".value(CompareOp::Gte),
            "<".value(CompareOp::Lt),
            ">".value(CompareOp::Gt),
        )),
        alt((
            keyword("BEGINSWITH").value(CompareOp::BeginsWith),
            keyword("ENDSWITH").value(CompareOp::EndsWith),
            keyword("CONTAINS").value(CompareOp::Contains),
            keyword("LIKE").value(CompareOp::Like),
            keyword("IN").value(CompareOp::In),
            keyword("BETWEEN").value(CompareOp::Between),
        )),
    ))
    .context(StrContext::Expected(StrContextValue::Description("operator")))
    .parse_next(input)
}

/// `[c]`, `[d]` or `[cd]` directly after the operator.
fn options(input: &mut &str) -> ModalResult<ComparisonOptions> {
    let flags = opt(delimited(
        '[',
        cut_err(take_while(1.., ['c', 'd'])),
        cut_err(']'),
    ))
    .parse_next(input)?;
    Ok(flags
        .and_then(ComparisonOptions::from_flags)
        .unwrap_or_default())
}

fn quantifier(input: &mut &str) -> ModalResult<Quantifier> {
    alt((
        keyword("ANY").value(Quantifier::Any),
        keyword("SOME").value(Quantifier::Any),
        keyword("ALL").value(Quantifier::All),
        keyword("NONE").value(Quantifier::None),
    ))
    .parse_next(input)
}

fn operand(input: &mut &str) -> ModalResult<Operand> {
    alt((
        keyword("SELF").value(Operand::Evaluated),
        key_path.map(Operand::Path),
    ))
    .context(StrContext::Expected(StrContextValue::Description("key path")))
    .parse_next(input)
}

fn comparison(input: &mut &str) -> ModalResult<Expr> {
    let quantifier = opt(terminated(quantifier, ws))
        .parse_next(input)?
        .unwrap_or(Quantifier::Direct);
    let lhs = operand.parse_next(input)?;
    ws.parse_next(input)?;
    let op = cut_err(compare_op).parse_next(input)?;
    let options = options.parse_next(input)?;
    let rhs = cut_err(literal).parse_next(input)?;
    Ok(Expr::Compare(Compare {
        quantifier,
        lhs,
        op,
        options,
        rhs,
    }))
}

// -- Expressions (precedence: OR < AND < NOT < primary) ---------------------

fn primary(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    alt((
        delimited('(', expr, (ws, cut_err(')'))),
        keyword("TRUEPREDICATE").value(Expr::True),
        keyword("FALSEPREDICATE").value(Expr::False),
        comparison,
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "predicate",
    )))
    .parse_next(input)
}

fn unary(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    if opt(alt((keyword("NOT"), "!"))).parse_next(input)?.is_some() {
        let inner = cut_err(unary).parse_next(input)?;
        Ok(Expr::Not(Box::new(inner)))
    } else {
        primary(input)
    }
}

fn group(first: Expr, rest: Vec<Expr>, wrap: fn(Vec<Expr>) -> Expr) -> Expr {
    if rest.is_empty() {
        return first;
    }
    let mut items = Vec::with_capacity(rest.len() + 1);
    items.push(first);
    items.extend(rest);
    wrap(items)
}

fn and_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = unary(input)?;
    let rest: Vec<Expr> = repeat(
        0..,
        preceded((ws, alt((keyword("AND"), "&&"))), cut_err(unary)),
    )
    .parse_next(input)?;
    Ok(group(first, rest, Expr::And))
}

fn or_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = and_expr(input)?;
    let rest: Vec<Expr> = repeat(
        0..,
        preceded((ws, alt((keyword("OR"), "||"))), cut_err(and_expr)),
    )
    .parse_next(input)?;
    Ok(group(first, rest, Expr::Or))
}

fn expr(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    or_expr(input)
}

// -- Top-level parser -------------------------------------------------------

pub fn predicate(input: &mut &str) -> ModalResult<Expr> {
    let parsed = expr.parse_next(input)?;
    ws.parse_next(input)?;
    Ok(parsed)
}

/// The text between parentheses that enclose the whole input.
pub fn enclosed<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    delimited((ws, '('), expr.take(), (ws, ')', ws)).parse_next(input)
}
