use thiserror::Error;

use super::comparison::CompareOp;

/// Construction-time failures: invalid schema declarations, unknown or
/// mistyped field lookups, and comparisons whose operand does not fit the
/// operator or field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("schema '{schema}' has no field '{path}'")]
    UnknownField { schema: &'static str, path: String },

    #[error("field '{path}' of schema '{schema}' is declared as {declared}, not {requested}")]
    KindMismatch {
        schema: &'static str,
        path: String,
        declared: String,
        requested: String,
    },

    #[error("duplicate field '{path}' in schema '{schema}'")]
    DuplicateField { schema: &'static str, path: String },

    #[error("invalid field path '{path}' in schema '{schema}': {reason}")]
    InvalidPath {
        schema: &'static str,
        path: String,
        reason: &'static str,
    },

    #[error("field path '{path}' in schema '{schema}' uses reserved word '{word}'")]
    ReservedWord {
        schema: &'static str,
        path: String,
        word: String,
    },

    #[error("operator {op} does not accept a nil operand")]
    NilOperand { op: CompareOp },

    #[error("field '{path}' is not nullable and cannot be compared to nil")]
    NotNullable { path: String },

    #[error("BETWEEN requires exactly two bounds, got {found}")]
    BetweenBounds { found: String },

    #[error("IN requires a list operand, got {found}")]
    InOperand { found: String },

    #[error("operator {op} requires a string field, '{path}' is {kind}")]
    StringOperator {
        op: CompareOp,
        path: String,
        kind: String,
    },

    #[error("operand {operand} cannot be compared to field '{path}' of kind {kind}")]
    OperandMismatch {
        path: String,
        kind: String,
        operand: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_field_message() {
        let err = SchemaError::UnknownField {
            schema: "Spaceship",
            path: "warpFactor".into(),
        };
        assert_eq!(err.to_string(), "schema 'Spaceship' has no field 'warpFactor'");
    }

    #[test]
    fn kind_mismatch_message() {
        let err = SchemaError::KindMismatch {
            schema: "Spaceship",
            path: "cost".into(),
            declared: "int".into(),
            requested: "string".into(),
        };
        assert_eq!(
            err.to_string(),
            "field 'cost' of schema 'Spaceship' is declared as int, not string"
        );
    }

    #[test]
    fn nil_operand_message() {
        let err = SchemaError::NilOperand { op: CompareOp::Lt };
        assert_eq!(err.to_string(), "operator < does not accept a nil operand");
    }

    #[test]
    fn between_bounds_message() {
        let err = SchemaError::BetweenBounds {
            found: "{1, 2, 3}".into(),
        };
        assert_eq!(
            err.to_string(),
            "BETWEEN requires exactly two bounds, got {1, 2, 3}"
        );
    }

    #[test]
    fn string_operator_message() {
        let err = SchemaError::StringOperator {
            op: CompareOp::Like,
            path: "cost".into(),
            kind: "int".into(),
        };
        assert_eq!(
            err.to_string(),
            "operator LIKE requires a string field, 'cost' is int"
        );
    }
}
