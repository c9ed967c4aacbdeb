use thiserror::Error;

use crate::evaluate::EvalError;
use crate::parse::ParseError;
use crate::SchemaError;

/// Unified error type covering schema validation, parsing, and evaluation.
///
/// Returned by convenience methods like
/// [`TypedPredicate::evaluate()`](crate::TypedPredicate::evaluate).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_pass_through() {
        let err = Error::from(EvalError::MissingField {
            path: "warp".to_owned(),
        });
        assert_eq!(err.to_string(), "record has no field 'warp'");

        let err = Error::from(SchemaError::NilOperand {
            op: crate::CompareOp::Lt,
        });
        assert!(matches!(err, Error::Schema(_)));
    }
}
