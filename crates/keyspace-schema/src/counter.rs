//! Integer counters backed by the store's atomic increments.
//!
//! Reads are lenient: a stored value reads as its leading integer, and a
//! missing, non-numeric or undecodable one reads as 0. Increments are never
//! emulated with read-modify-write; they go straight to the store's atomic
//! create-on-missing increment.

use keyspace_store::{DuplicateSchemaKey, Store, StoreError};
use serde_json::Value;
use tracing::debug;

use crate::error::SchemaResult;

/// A single counter under one key.
#[derive(Debug, Clone)]
pub struct Counter<S> {
    store: S,
    key: String,
}

/// Declare a counter at `key` on `store`.
pub fn define_counter<S>(store: &S, key: impl Into<String>) -> Result<Counter<S>, DuplicateSchemaKey>
where
    S: Store + Clone,
{
    let key = key.into();
    store.mark_key_as_used(&key)?;
    Ok(Counter {
        store: store.clone(),
        key,
    })
}

impl<S: Store> Counter<S> {
    /// Current value, 0 if unset.
    pub async fn get(&self) -> SchemaResult<i64> {
        match self.store.get(&self.key).await {
            Ok(value) => Ok(value.as_ref().map_or(0, counter_value)),
            // Undecodable payloads count as zero, same as non-numeric ones.
            Err(StoreError::Serialization(e)) => {
                debug!(key = %self.key, error = %e, "counter payload undecodable, reading as 0");
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Atomically add `by` and return the new value.
    pub async fn incrby(&self, by: i64) -> SchemaResult<i64> {
        Ok(self.store.incrby(&self.key, by).await?)
    }

    /// Reset to 0 by deleting the key.
    pub async fn zero(&self) -> SchemaResult<()> {
        Ok(self.store.del(&self.key).await?)
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// A hash of counters under one key, addressed by field name.
#[derive(Debug, Clone)]
pub struct HashOfCounters<S> {
    store: S,
    key: String,
}

/// Declare a hash of counters at `key` on `store`.
pub fn define_hash_of_counters<S>(
    store: &S,
    key: impl Into<String>,
) -> Result<HashOfCounters<S>, DuplicateSchemaKey>
where
    S: Store + Clone,
{
    let key = key.into();
    store.mark_key_as_used(&key)?;
    Ok(HashOfCounters {
        store: store.clone(),
        key,
    })
}

impl<S: Store> HashOfCounters<S> {
    /// Current value of one field, 0 if unset.
    pub async fn get(&self, field: &str) -> SchemaResult<i64> {
        let raw = self.store.hget(&self.key, field).await?;
        Ok(raw.as_deref().map_or(0, parse_counter))
    }

    /// Atomically add `by` to one field and return the new value.
    pub async fn incrby(&self, field: &str, by: i64) -> SchemaResult<i64> {
        Ok(self.store.hincrby(&self.key, field, by).await?)
    }

    /// Reset one field to 0 by deleting it.
    pub async fn zero(&self, field: &str) -> SchemaResult<()> {
        Ok(self.store.hdel(&self.key, field).await?)
    }

    /// Remove every field. The key stays claimed.
    pub async fn del(&self) -> SchemaResult<()> {
        Ok(self.store.del(&self.key).await?)
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

fn counter_value(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(truncate))
            .unwrap_or(0),
        Value::String(s) => parse_counter(s),
        _ => 0,
    }
}

/// Float toward zero, `None` if it does not fit an `i64`.
fn truncate(f: f64) -> Option<i64> {
    let t = f.trunc();
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
    (t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64).then_some(t as i64)
}

/// Leading integer of `text`: optional whitespace, an optional sign, then
/// digits up to the first non-digit. 0 if there are no digits or the value
/// overflows.
fn parse_counter(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return 0;
    }
    rest[..end]
        .bytes()
        .try_fold(0i64, |acc, b| {
            let digit = i64::from(b - b'0');
            let acc = acc.checked_mul(10)?;
            if negative {
                acc.checked_sub(digit)
            } else {
                acc.checked_add(digit)
            }
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use keyspace_store::{Backend, MemoryBackend, RootStore, StoreExt};
    use serde_json::json;

    fn root() -> RootStore<MemoryBackend> {
        RootStore::new(MemoryBackend::new())
    }

    #[tokio::test]
    async fn counter_lifecycle() {
        let kv = root();
        let ns = kv.namespaced_by("redis-schema:test:");
        let c = define_counter(&ns, "mycounter").unwrap();

        c.zero().await.unwrap();
        assert_eq!(c.get().await.unwrap(), 0);
        assert_eq!(c.incrby(2).await.unwrap(), 2);
        assert_eq!(c.get().await.unwrap(), 2);
        assert_eq!(c.incrby(1).await.unwrap(), 3);
        assert_eq!(c.get().await.unwrap(), 3);
        c.zero().await.unwrap();
        assert_eq!(c.get().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn fresh_counter_increments_from_nothing() {
        let kv = root();
        let c = define_counter(&kv, "fresh").unwrap();
        assert_eq!(c.incrby(1).await.unwrap(), 1);
        assert_eq!(c.incrby(1).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn non_numeric_values_read_as_zero() {
        let kv = root();
        let c = define_counter(&kv, "c").unwrap();

        kv.set("c", json!("abc"), None).await.unwrap();
        assert_eq!(c.get().await.unwrap(), 0);

        kv.set("c", json!({"n": 1}), None).await.unwrap();
        assert_eq!(c.get().await.unwrap(), 0);

        kv.set("c", json!("17"), None).await.unwrap();
        assert_eq!(c.get().await.unwrap(), 17);

        kv.raw_connection()
            .set("c", "garbage".into(), None)
            .await
            .unwrap();
        assert_eq!(c.get().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn increment_of_non_integer_propagates() {
        let kv = root();
        let c = define_counter(&kv, "c").unwrap();
        kv.set("c", json!("abc"), None).await.unwrap();
        assert!(matches!(
            c.incrby(1).await,
            Err(SchemaError::Store(StoreError::NotAnInteger { .. }))
        ));
    }

    #[tokio::test]
    async fn read_of_hash_key_is_not_masked() {
        let kv = root();
        let c = define_counter(&kv, "c").unwrap();
        kv.hset("c", "f", "1".into()).await.unwrap();
        assert!(matches!(
            c.get().await,
            Err(SchemaError::Store(StoreError::WrongType { .. }))
        ));
    }

    #[tokio::test]
    async fn hash_of_counters_lifecycle() {
        let kv = root();
        let ns = kv.namespaced_by("redis-schema:test:");
        let c = define_hash_of_counters(&ns, "myhashcounters").unwrap();

        c.del().await.unwrap();
        assert_eq!(c.get("foo").await.unwrap(), 0);
        c.incrby("foo", 2).await.unwrap();
        c.incrby("bar", 1).await.unwrap();
        assert_eq!(c.get("foo").await.unwrap(), 2);
        assert_eq!(c.get("bar").await.unwrap(), 1);

        c.incrby("foo", 2).await.unwrap();
        c.zero("bar").await.unwrap();
        assert_eq!(c.get("foo").await.unwrap(), 4);
        assert_eq!(c.get("bar").await.unwrap(), 0);

        c.del().await.unwrap();
        assert_eq!(c.get("foo").await.unwrap(), 0);
        assert!(ns.is_used("myhashcounters"));
    }

    #[tokio::test]
    async fn hash_counter_field_with_garbage_reads_as_zero() {
        let kv = root();
        let c = define_hash_of_counters(&kv, "h").unwrap();
        kv.hset("h", "f", "lots".into()).await.unwrap();
        assert_eq!(c.get("f").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrent_increments_through_a_namespace() {
        let kv = root();
        let ns = kv.namespaced_by("stats:");
        let c = define_counter(&ns, "hits").unwrap();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let c = c.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    c.incrby(1).await.unwrap();
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(c.get().await.unwrap(), 200);
    }

    #[tokio::test]
    async fn partly_numeric_values_read_their_leading_integer() {
        let kv = root();
        let hits = define_hash_of_counters(&kv, "hits").unwrap();
        kv.hset("hits", "a", "4.5".into()).await.unwrap();
        kv.hset("hits", "b", "12abc".into()).await.unwrap();
        assert_eq!(hits.get("a").await.unwrap(), 4);
        assert_eq!(hits.get("b").await.unwrap(), 12);

        let total = define_counter(&kv, "total").unwrap();
        kv.set("total", json!(7.9), None).await.unwrap();
        assert_eq!(total.get().await.unwrap(), 7);
        kv.set("total", json!(-7.9), None).await.unwrap();
        assert_eq!(total.get().await.unwrap(), -7);
    }

    #[test]
    fn parse_counter_takes_leading_integer() {
        assert_eq!(parse_counter("42"), 42);
        assert_eq!(parse_counter(" -7 "), -7);
        assert_eq!(parse_counter("+3"), 3);
        assert_eq!(parse_counter("4.5"), 4);
        assert_eq!(parse_counter("12abc"), 12);
        assert_eq!(parse_counter("-9223372036854775808"), i64::MIN);
        assert_eq!(parse_counter("9223372036854775808"), 0);
        assert_eq!(parse_counter(""), 0);
        assert_eq!(parse_counter("-"), 0);
        assert_eq!(parse_counter("abc12"), 0);
    }

    #[test]
    fn numeric_values_truncate_toward_zero() {
        assert_eq!(counter_value(&json!(9)), 9);
        assert_eq!(counter_value(&json!(1.5)), 1);
        assert_eq!(counter_value(&json!(-1.5)), -1);
        assert_eq!(counter_value(&json!(1e30)), 0);
        assert_eq!(counter_value(&json!(u64::MAX)), 0);
        assert_eq!(counter_value(&json!("8 apples")), 8);
        assert_eq!(counter_value(&json!(null)), 0);
    }
}
