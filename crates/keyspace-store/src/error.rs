use thiserror::Error;

/// Errors from store and backend operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend has been closed by its owner.
    #[error("store is closed")]
    Closed,

    /// A string operation was applied to a hash key, or the reverse.
    #[error("wrong kind of value at key {key}: expected {expected}")]
    WrongType { key: String, expected: &'static str },

    /// An increment targeted a value that is not an integer.
    #[error("value at {key} is not an integer")]
    NotAnInteger { key: String },

    /// An increment would overflow a signed 64-bit integer.
    #[error("increment of {key} would overflow")]
    Overflow { key: String },

    /// A write was given a zero time-to-live.
    #[error("invalid expiry for key {key}")]
    InvalidExpiry { key: String },

    /// A stored payload could not be decoded, or a value could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store configuration is invalid or names an unknown backend.
    #[error("configuration error: {0}")]
    Config(String),

    /// Failure inside the backend itself.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A fully-qualified key was registered by two schema declarations.
///
/// This is a wiring mistake, not a runtime condition: it is reported when
/// schemas are declared and must abort whatever is declaring them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema key already used: {key}")]
pub struct DuplicateSchemaKey {
    /// The fully-qualified key, as seen by the root store.
    pub key: String,
}
