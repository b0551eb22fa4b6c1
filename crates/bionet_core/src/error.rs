//! Error types for host-facing engine operations.
//!
//! Nothing inside the tick returns an error; these cover stimulus validation and
//! snapshot import, where the host handed us something we cannot use.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Snapshot text could not be parsed.
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// Snapshot parsed but violates a structural rule.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Brightness grid does not match the retina size.
    #[error("Invalid image: expected {expected} cells, got {actual}")]
    InvalidImage { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    #[must_use]
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Self::MalformedSnapshot(msg.into())
    }

    #[must_use]
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidSnapshot(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::InvalidImage {
            expected: 100,
            actual: 3,
        };
        assert_eq!(err.to_string(), "Invalid image: expected 100 cells, got 3");
        assert!(EngineError::malformed("missing field `neurons`")
            .to_string()
            .contains("neurons"));
    }
}
