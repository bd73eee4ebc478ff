//! Error types for schema operations.

use keyspace_codec::ValidationError;
use keyspace_store::StoreError;
use thiserror::Error;

/// Errors from reading or writing through a schema capability object.
///
/// Registration conflicts are not part of this type: builders report them as
/// [`DuplicateSchemaKey`](keyspace_store::DuplicateSchemaKey) before any
/// capability object exists.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The store (or its transport encoding) failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The stored value does not match the schema's codec.
    #[error("invalid stored value: {0}")]
    Validation(#[from] ValidationError),
}

impl SchemaError {
    /// Returns `true` if the failure is a codec mismatch rather than a store failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Convenience type alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
