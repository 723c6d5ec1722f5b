//! Error types for yarameta-rules

/// Result type for yarameta-rules operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading rule text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("content is not valid UTF-8: {0}")]
    Encoding(String),
}

impl Error {
    /// Build a parse error located at byte `offset` of `source`.
    pub fn parse_at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rsplit('\n')
            .next()
            .map(|l| l.chars().count())
            .unwrap_or(0)
            + 1;
        Self::Parse {
            line,
            column,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_at_position() {
        let source = "rule a {\n  condition:\n    ???\n}";
        let offset = source.find("???").unwrap();
        assert_eq!(
            Error::parse_at(source, offset, "boom"),
            Error::Parse {
                line: 3,
                column: 5,
                message: "boom".into()
            }
        );
    }

    #[test]
    fn test_parse_at_clamps_offset() {
        let err = Error::parse_at("ab", 10, "eof");
        assert_eq!(err.to_string(), "line 1, column 3: eof");
    }
}
