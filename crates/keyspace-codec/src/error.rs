//! Error type for codec validation.

use thiserror::Error;

/// A raw value did not have the shape a codec expected.
///
/// Recoverable: the failing read leaves the stored data and the schema
/// registry untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {reason}")]
pub struct ValidationError {
    reason: String,
}

impl ValidationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Human-readable description of the mismatch.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Convenience type alias for codec operations.
pub type Result<T> = std::result::Result<T, ValidationError>;
