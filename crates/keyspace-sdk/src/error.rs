use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("store error: {0}")]
    Store(#[from] keyspace_store::StoreError),

    #[error(transparent)]
    DuplicateSchemaKey(#[from] keyspace_store::DuplicateSchemaKey),
}

pub type SdkResult<T> = Result<T, SdkError>;
