use keyspace_codec::Codec;
use keyspace_store::{DuplicateSchemaKey, Store, StoreError};
use serde_json::Value;
use tracing::debug;

use crate::error::SchemaResult;

/// A hash of typed values under one key, addressed by field name.
///
/// Each field holds the JSON text of the codec's raw form.
#[derive(Debug, Clone)]
pub struct HashOf<S, C> {
    store: S,
    key: String,
    codec: C,
}

/// Declare a hash of typed values at `key` on `store`.
///
/// The key is claimed in the root's schema registry before returning.
pub fn define_hash_of<S, C>(
    store: &S,
    key: impl Into<String>,
    codec: C,
) -> Result<HashOf<S, C>, DuplicateSchemaKey>
where
    S: Store + Clone,
    C: Codec,
{
    let key = key.into();
    store.mark_key_as_used(&key)?;
    Ok(HashOf {
        store: store.clone(),
        key,
        codec,
    })
}

impl<S: Store, C: Codec> HashOf<S, C> {
    /// Read and validate one field. A missing field reaches the codec as `null`.
    pub async fn hget(&self, field: &str) -> SchemaResult<C::Value> {
        let raw = match self.store.hget(&self.key, field).await? {
            Some(text) => serde_json::from_str(&text).map_err(StoreError::from)?,
            None => Value::Null,
        };
        self.codec.read(&raw).map_err(|e| {
            debug!(key = %self.key, field, error = %e, "stored field rejected by codec");
            e.into()
        })
    }

    /// Encode and store one field.
    pub async fn hset(&self, field: &str, value: &C::Value) -> SchemaResult<()> {
        let raw = self.codec.write(value)?;
        let text = serde_json::to_string(&raw).map_err(StoreError::from)?;
        Ok(self.store.hset(&self.key, field, text).await?)
    }

    /// Remove one field.
    pub async fn hdel(&self, field: &str) -> SchemaResult<()> {
        Ok(self.store.hdel(&self.key, field).await?)
    }

    /// Remove the whole hash. The key stays claimed.
    pub async fn del(&self) -> SchemaResult<()> {
        Ok(self.store.del(&self.key).await?)
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}
