//! Error types for Trellis.
//!
//! Lowering failures are terminal: a query that cannot be lowered is rejected
//! before submission and no partially built plan is ever returned.

use thiserror::Error;

/// Result type alias using the Trellis [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A step kind, modulation combination, or accumulator shape that has no
    /// lowering.
    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),

    /// Malformed builder or job arguments.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Encoding or decoding of a payload or job frame failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A lowering invariant was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for [`Error::UnsupportedConstruct`].
    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::UnsupportedConstruct(what.into())
    }

    /// Shorthand for [`Error::InvalidConfiguration`].
    pub fn invalid_config(what: impl Into<String>) -> Self {
        Self::InvalidConfiguration(what.into())
    }

    /// Returns true if this error rejects the query itself rather than
    /// signalling a bug or an I/O problem.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedConstruct(_) | Self::InvalidConfiguration(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = Error::unsupported("step `drop`");
        assert_eq!(err.to_string(), "unsupported construct: step `drop`");
        assert!(err.is_user_error());

        let err = Error::Internal("sink".to_string());
        assert!(!err.is_user_error());
    }
}
