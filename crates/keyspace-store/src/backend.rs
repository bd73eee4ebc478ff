use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreResult;

/// Primitive key-value medium underneath a [`RootStore`](crate::RootStore).
///
/// Keys are fully qualified: namespacing has already been applied by the
/// time a call reaches the backend. Values are opaque strings; hashes map
/// field names to strings.
///
/// All implementations must satisfy these invariants:
/// - `incrby` and `hincrby` are atomic per key and create a missing key or
///   field with the increment as its value.
/// - Reads of a missing or expired key return `Ok(None)`, never an error.
/// - After `close`, every operation fails with
///   [`StoreError::Closed`](crate::StoreError::Closed).
/// - Errors are propagated, never retried or suppressed.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Read the string value at `key`.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a string value, replacing whatever was stored at `key`.
    ///
    /// With `expiry`, the key disappears once the duration has elapsed.
    async fn set(&self, key: &str, value: String, expiry: Option<Duration>) -> StoreResult<()>;

    /// Delete `key`. Returns `true` if it existed.
    async fn del(&self, key: &str) -> StoreResult<bool>;

    /// Atomically add `by` to the integer at `key` and return the new value.
    async fn incrby(&self, key: &str, by: i64) -> StoreResult<i64>;

    /// Read one field of the hash at `key`.
    async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>>;

    /// Write one field of the hash at `key`, creating the hash if needed.
    async fn hset(&self, key: &str, field: &str, value: String) -> StoreResult<()>;

    /// Delete one field of the hash at `key`. Returns `true` if it existed.
    async fn hdel(&self, key: &str, field: &str) -> StoreResult<bool>;

    /// Atomically add `by` to the integer in a hash field and return the new value.
    async fn hincrby(&self, key: &str, field: &str, by: i64) -> StoreResult<i64>;

    /// Release the backend. Idempotent.
    async fn close(&self) -> StoreResult<()>;
}
