//! Reads the render format back into an expression tree.
//!
//! Used by [`AnyPredicate::parse`](crate::AnyPredicate::parse) to recover a
//! predicate's shape and by the reference evaluator.

mod ast;
mod error;
mod grammar;

pub use ast::{Compare, Expr, Operand, Quantifier};
pub use error::ParseError;

/// Parse predicate text into an [`Expr`].
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not valid predicate syntax.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    use winnow::Parser;
    grammar::predicate
        .parse(input)
        .map_err(|e| ParseError::new(e.offset(), e.inner().to_string()))
}

/// `text` without parentheses that enclose all of it.
pub(crate) fn strip_enclosing(text: &str) -> &str {
    use winnow::Parser;
    let mut text = text.trim();
    while let Ok(inner) = grammar::enclosed.parse(text) {
        text = inner.trim();
    }
    text
}
