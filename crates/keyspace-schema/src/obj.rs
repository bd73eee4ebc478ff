use std::time::Duration;

use keyspace_codec::Codec;
use keyspace_store::{DuplicateSchemaKey, Store};
use serde_json::Value;
use tracing::debug;

use crate::error::SchemaResult;

/// A single typed value stored under one key.
#[derive(Debug, Clone)]
pub struct Obj<S, C> {
    store: S,
    key: String,
    codec: C,
}

/// Declare a typed value at `key` on `store`.
///
/// Claims the key in the root's schema registry before returning; a key that
/// is already claimed anywhere in the namespace tree fails here, before any
/// store I/O.
pub fn define_obj<S, C>(
    store: &S,
    key: impl Into<String>,
    codec: C,
) -> Result<Obj<S, C>, DuplicateSchemaKey>
where
    S: Store + Clone,
    C: Codec,
{
    let key = key.into();
    store.mark_key_as_used(&key)?;
    Ok(Obj {
        store: store.clone(),
        key,
        codec,
    })
}

impl<S: Store, C: Codec> Obj<S, C> {
    /// Read and validate the value.
    ///
    /// A missing key reaches the codec as `null`; whether that is an error
    /// or a default is the codec's decision.
    pub async fn get(&self) -> SchemaResult<C::Value> {
        let raw = self.store.get(&self.key).await?.unwrap_or(Value::Null);
        self.codec.read(&raw).map_err(|e| {
            debug!(key = %self.key, error = %e, "stored value rejected by codec");
            e.into()
        })
    }

    /// Encode and store `value`. Returns whether the store accepted it.
    pub async fn set(&self, value: &C::Value) -> SchemaResult<bool> {
        let raw = self.codec.write(value)?;
        Ok(self.store.set(&self.key, raw, None).await?)
    }

    /// Like [`set`](Self::set), but the value expires after `expiry`.
    pub async fn set_with_expiry(&self, value: &C::Value, expiry: Duration) -> SchemaResult<bool> {
        let raw = self.codec.write(value)?;
        Ok(self.store.set(&self.key, raw, Some(expiry)).await?)
    }

    /// Remove the value. The key stays claimed.
    pub async fn del(&self) -> SchemaResult<()> {
        Ok(self.store.del(&self.key).await?)
    }

    /// The key relative to the store this schema was declared on.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }
}
