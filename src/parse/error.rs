use std::fmt;

/// Errors produced when reading predicate text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    offset: usize,
    message: String,
}

impl ParseError {
    pub(crate) fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }

    /// Byte offset into the input where parsing failed.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "invalid predicate at offset {}", self.offset)
        } else {
            write!(
                f,
                "invalid predicate at offset {}: {}",
                self.offset, self.message
            )
        }
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ParseError::new(7, "expected literal");
        assert_eq!(err.to_string(), "invalid predicate at offset 7: expected literal");
        assert_eq!(err.offset(), 7);
    }

    #[test]
    fn error_display_without_message() {
        assert_eq!(
            ParseError::new(0, "").to_string(),
            "invalid predicate at offset 0"
        );
    }
}
