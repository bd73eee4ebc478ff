//! Prefix namespaces over a [`Store`].
//!
//! A [`Namespace`] forwards every call to its parent with its prefix
//! prepended to the key. Namespaces can be namespaced again, forming a tree
//! whose root is always a [`RootStore`](crate::RootStore):
//!
//! ```
//! use keyspace_store::{MemoryBackend, RootStore, Store, StoreExt};
//!
//! let root = RootStore::new(MemoryBackend::new());
//! let app = root.namespaced_by("app:");
//! let users = app.namespaced_by("users:");
//!
//! users.mark_key_as_used("alice").unwrap();
//! assert!(root.is_used("app:users:alice"));
//! assert!(app.is_used("users:alice"));
//! assert_eq!(users.prefix(), "users:");
//! assert_eq!(users.full_prefix(), "app:users:");
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{DuplicateSchemaKey, StoreResult};
use crate::store::Store;

/// A store that prepends a fixed prefix to every key it forwards.
///
/// Holds only its prefix and a shared handle to its parent; the backend and
/// the schema registry stay with the root.
pub struct Namespace<C> {
    parent: Arc<dyn Store<Connection = C>>,
    prefix: String,
}

impl<C: Send + Sync + 'static> Namespace<C> {
    pub fn new(parent: Arc<dyn Store<Connection = C>>, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        debug!(
            parent = %parent.full_prefix(),
            prefix = %prefix,
            "namespace derived"
        );
        Self { parent, prefix }
    }

    pub fn parent(&self) -> &Arc<dyn Store<Connection = C>> {
        &self.parent
    }

    fn qualify(&self, key: &str) -> String {
        let mut qualified = String::with_capacity(self.prefix.len() + key.len());
        qualified.push_str(&self.prefix);
        qualified.push_str(key);
        qualified
    }
}

impl<C> Clone for Namespace<C> {
    fn clone(&self) -> Self {
        Self {
            parent: Arc::clone(&self.parent),
            prefix: self.prefix.clone(),
        }
    }
}

impl<C: Send + Sync + 'static> fmt::Debug for Namespace<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("prefix", &self.prefix)
            .field("full_prefix", &self.full_prefix())
            .finish()
    }
}

#[async_trait]
impl<C: Send + Sync + 'static> Store for Namespace<C> {
    type Connection = C;

    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        self.parent.get(&self.qualify(key)).await
    }

    async fn set(&self, key: &str, value: Value, expiry: Option<Duration>) -> StoreResult<bool> {
        self.parent.set(&self.qualify(key), value, expiry).await
    }

    async fn del(&self, key: &str) -> StoreResult<()> {
        self.parent.del(&self.qualify(key)).await
    }

    async fn incrby(&self, key: &str, by: i64) -> StoreResult<i64> {
        self.parent.incrby(&self.qualify(key), by).await
    }

    async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        self.parent.hget(&self.qualify(key), field).await
    }

    async fn hset(&self, key: &str, field: &str, value: String) -> StoreResult<()> {
        self.parent.hset(&self.qualify(key), field, value).await
    }

    async fn hdel(&self, key: &str, field: &str) -> StoreResult<()> {
        self.parent.hdel(&self.qualify(key), field).await
    }

    async fn hincrby(&self, key: &str, field: &str, by: i64) -> StoreResult<i64> {
        self.parent.hincrby(&self.qualify(key), field, by).await
    }

    fn raw_connection(&self) -> &C {
        self.parent.raw_connection()
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn full_prefix(&self) -> String {
        self.parent.full_prefix() + &self.prefix
    }

    fn mark_key_as_used(&self, key: &str) -> Result<(), DuplicateSchemaKey> {
        self.parent.mark_key_as_used(&self.qualify(key))
    }

    fn is_used(&self, key: &str) -> bool {
        self.parent.is_used(&self.qualify(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::memory::MemoryBackend;
    use crate::store::{RootStore, StoreExt};
    use proptest::prelude::*;
    use serde_json::json;

    fn root() -> RootStore<MemoryBackend> {
        RootStore::new(MemoryBackend::new())
    }

    #[test]
    fn prefixes_compose_left_to_right() {
        let kv = root();
        let ns = kv.namespaced_by("redis-schema:test:");
        let one = ns.namespaced_by("one:");
        let three = one.namespaced_by("three:");

        assert_eq!(one.prefix(), "one:");
        assert_eq!(one.full_prefix(), "redis-schema:test:one:");
        assert_eq!(three.prefix(), "three:");
        assert_eq!(three.full_prefix(), "redis-schema:test:one:three:");
    }

    #[test]
    fn registry_is_global_across_the_tree() {
        let kv = root();
        let ns = kv.namespaced_by("redis-schema:test:");
        let one = ns.namespaced_by("one:");
        let three = one.namespaced_by("three:");

        ns.mark_key_as_used("one:three:blah").unwrap();
        assert!(kv.is_used("redis-schema:test:one:three:blah"));
        assert!(ns.is_used("one:three:blah"));
        assert!(!ns.is_used("one:three:blorg"));
        assert!(one.is_used("three:blah"));
        assert!(three.is_used("blah"));
        assert!(!three.is_used("blorg"));

        let err = three.mark_key_as_used("blah").unwrap_err();
        assert_eq!(err.key, "redis-schema:test:one:three:blah");

        three.mark_key_as_used("blorg").unwrap();
        assert!(one.is_used("three:blorg"));
        assert!(three.is_used("blorg"));
    }

    #[test]
    fn unrelated_branches_collide_on_same_full_key() {
        let kv = root();
        let left = kv.namespaced_by("a:").namespaced_by("b:");
        let right = kv.namespaced_by("a:b:");
        left.mark_key_as_used("k").unwrap();
        assert!(right.is_used("k"));
        assert!(right.mark_key_as_used("k").is_err());
    }

    #[tokio::test]
    async fn values_are_isolated_between_namespaces() {
        let kv = root();
        let ns = kv.namespaced_by("redis-schema:test:");
        let one = ns.namespaced_by("one:");
        let two = ns.namespaced_by("two:");

        one.set("myKey", json!(123), None).await.unwrap();
        assert_eq!(one.get("myKey").await.unwrap(), Some(json!(123)));
        assert_eq!(two.get("myKey").await.unwrap(), None);
        assert_eq!(kv.get("myKey").await.unwrap(), None);
        assert_eq!(
            kv.get("redis-schema:test:one:myKey").await.unwrap(),
            Some(json!(123))
        );

        two.del("myKey").await.unwrap();
        assert_eq!(one.get("myKey").await.unwrap(), Some(json!(123)));
        one.del("myKey").await.unwrap();
        assert_eq!(one.get("myKey").await.unwrap(), None);
    }

    #[tokio::test]
    async fn counter_and_hash_calls_are_prefixed() {
        let kv = root();
        let ns = kv.namespaced_by("ns:");

        assert_eq!(ns.incrby("hits", 3).await.unwrap(), 3);
        assert_eq!(ns.hincrby("pages", "home", 2).await.unwrap(), 2);
        ns.hset("names", "1", "\"ada\"".into()).await.unwrap();

        let backend = kv.raw_connection();
        assert_eq!(
            backend.keys(),
            vec!["ns:hits".to_string(), "ns:names".into(), "ns:pages".into()]
        );
        assert_eq!(ns.hget("names", "1").await.unwrap().as_deref(), Some("\"ada\""));

        ns.hdel("names", "1").await.unwrap();
        assert_eq!(kv.hget("ns:names", "1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn raw_connection_reaches_the_root_backend() {
        let kv = root();
        let deep = kv.namespaced_by("a:").namespaced_by("b:");
        deep.set("k", json!("v"), None).await.unwrap();
        assert!(std::ptr::eq(deep.raw_connection(), kv.raw_connection()));
        assert_eq!(deep.raw_connection().keys(), vec!["a:b:k".to_string()]);
    }

    #[tokio::test]
    async fn closing_root_invalidates_namespaces() {
        let kv = root();
        let ns = kv.namespaced_by("ns:");
        kv.close().await.unwrap();
        assert!(matches!(ns.get("k").await, Err(StoreError::Closed)));
        assert!(matches!(ns.hincrby("h", "f", 1).await, Err(StoreError::Closed)));
    }

    #[test]
    fn empty_prefix_is_transparent() {
        let kv = root();
        let ns = kv.namespaced_by("");
        ns.mark_key_as_used("k").unwrap();
        assert!(kv.is_used("k"));
    }

    proptest! {
        #[test]
        fn nested_namespaces_match_concatenated_prefix(
            a in "[a-z:]{0,8}",
            b in "[a-z:]{0,8}",
            key in "[a-z:]{0,8}",
        ) {
            let nested_root = root();
            let nested = nested_root.namespaced_by(a.clone()).namespaced_by(b.clone());
            nested.mark_key_as_used(&key).unwrap();

            let flat_root = root();
            let flat = flat_root.namespaced_by(format!("{a}{b}"));
            flat.mark_key_as_used(&key).unwrap();

            prop_assert_eq!(nested_root.registry().keys(), flat_root.registry().keys());
            prop_assert_eq!(nested_root.registry().keys(), vec![format!("{a}{b}{key}")]);
            prop_assert_eq!(nested.full_prefix(), flat.full_prefix());
        }
    }
}
