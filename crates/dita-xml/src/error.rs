//! Errors reported by the well-formedness checker.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Why a document or fragment is not well-formed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// quick-xml rejected the input.
    #[error("malformed XML{}: {message}", .offset.map(|o| format!(" at byte {o}")).unwrap_or_default())]
    Malformed { message: String, offset: Option<u64> },

    /// The input ended with elements still open.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("mismatched end tag: expected </{expected}>, found </{found}>")]
    MismatchedEndTag { expected: String, found: String },

    /// An end tag with nothing open.
    #[error("unexpected end tag </{0}>")]
    UnexpectedEndTag(String),

    #[error("text outside of the root element: {0:?}")]
    TextOutsideRoot(String),

    #[error("no root element")]
    EmptyDocument,

    #[error("more than one root element")]
    MultipleRoots,
}

impl Error {
    pub(crate) fn malformed(message: impl std::fmt::Display, offset: Option<u64>) -> Self {
        Error::Malformed {
            message: message.to_string(),
            offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_offset() {
        assert_eq!(
            Error::malformed("bad entity", Some(12)).to_string(),
            "malformed XML at byte 12: bad entity"
        );
        assert_eq!(
            Error::malformed("bad entity", None).to_string(),
            "malformed XML: bad entity"
        );
    }
}
