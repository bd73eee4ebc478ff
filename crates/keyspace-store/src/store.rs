use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::backend::Backend;
use crate::config::{BackendKind, StoreConfig};
use crate::error::{DuplicateSchemaKey, StoreResult};
use crate::memory::MemoryBackend;
use crate::namespace::Namespace;
use crate::registry::SchemaRegistry;

/// Key-value interface shared by the root store and every namespace.
///
/// Keys passed to a store are relative to it: a namespace prepends its
/// prefix and forwards to its parent until the root is reached. Results and
/// errors pass through the chain unchanged.
///
/// Values handed to `set` and returned by `get` are [`Value`]s; the root
/// store owns their transport encoding. Hash fields carry plain strings.
#[async_trait]
pub trait Store: Send + Sync {
    /// The backend handle at the root of the chain.
    type Connection: Send + Sync + 'static;

    /// Read the value at `key`, `None` if absent.
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Write `value` at `key`, optionally expiring after `expiry`.
    /// Returns whether the write was accepted.
    async fn set(&self, key: &str, value: Value, expiry: Option<Duration>) -> StoreResult<bool>;

    async fn del(&self, key: &str) -> StoreResult<()>;

    /// Atomically increment the counter at `key` and return the new value.
    /// A missing key is created holding `by`.
    async fn incrby(&self, key: &str, by: i64) -> StoreResult<i64>;

    async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>>;

    async fn hset(&self, key: &str, field: &str, value: String) -> StoreResult<()>;

    async fn hdel(&self, key: &str, field: &str) -> StoreResult<()>;

    /// Atomically increment a hash field and return the new value.
    /// A missing field is created holding `by`.
    async fn hincrby(&self, key: &str, field: &str, by: i64) -> StoreResult<i64>;

    /// Escape hatch to the root backend.
    fn raw_connection(&self) -> &Self::Connection;

    /// This store's own prefix segment. The root's is empty.
    fn prefix(&self) -> &str;

    /// The prefix applied to every key on its way to the root.
    ///
    /// For introspection only; key resolution always goes through the
    /// parent chain.
    fn full_prefix(&self) -> String;

    /// Claim `key` in the root's schema registry.
    fn mark_key_as_used(&self, key: &str) -> Result<(), DuplicateSchemaKey>;

    /// Returns `true` if `key` has been claimed in the root's schema registry.
    fn is_used(&self, key: &str) -> bool;
}

/// Derivation of namespaces from any concrete store handle.
pub trait StoreExt: Store + Clone + Sized + 'static {
    /// Derive a namespace that prepends `prefix` to every key.
    ///
    /// No separator is inserted; include one in `prefix` if wanted.
    fn namespaced_by(&self, prefix: impl Into<String>) -> Namespace<Self::Connection> {
        Namespace::new(Arc::new(self.clone()), prefix)
    }
}

impl<S: Store + Clone + 'static> StoreExt for S {}

/// The store at the root of a namespace tree.
///
/// Owns the [`SchemaRegistry`] for the whole tree and transport-encodes
/// values as JSON text before they reach the backend. Clones share both the
/// backend and the registry: a clone is the same store, not a new one.
pub struct RootStore<B> {
    backend: Arc<B>,
    registry: Arc<SchemaRegistry>,
}

impl<B: Backend> RootStore<B> {
    /// Wrap a backend with a fresh, empty registry.
    pub fn new(backend: B) -> Self {
        Self::with_shared_backend(Arc::new(backend))
    }

    /// Wrap a backend the caller keeps a handle to.
    ///
    /// Each call creates an independent registry, so two root stores over
    /// the same backend do not see each other's schema keys.
    pub fn with_shared_backend(backend: Arc<B>) -> Self {
        Self {
            backend,
            registry: Arc::new(SchemaRegistry::new()),
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Close the backend. Every store derived from this one stops working.
    pub async fn close(&self) -> StoreResult<()> {
        self.backend.close().await
    }
}

impl RootStore<MemoryBackend> {
    /// Open the backend named by `config.url`.
    ///
    /// The configured namespace is not applied here; see
    /// [`StoreConfig::namespace`].
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        match config.backend_kind()? {
            BackendKind::Memory => Ok(Self::new(MemoryBackend::new())),
        }
    }
}

impl<B> Clone for RootStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<B: fmt::Debug> fmt::Debug for RootStore<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootStore")
            .field("backend", &self.backend)
            .field("schema_keys", &self.registry.len())
            .finish()
    }
}

#[async_trait]
impl<B: Backend + 'static> Store for RootStore<B> {
    type Connection = B;

    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        match self.backend.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value, expiry: Option<Duration>) -> StoreResult<bool> {
        let raw = serde_json::to_string(&value)?;
        self.backend.set(key, raw, expiry).await?;
        Ok(true)
    }

    async fn del(&self, key: &str) -> StoreResult<()> {
        self.backend.del(key).await?;
        Ok(())
    }

    async fn incrby(&self, key: &str, by: i64) -> StoreResult<i64> {
        self.backend.incrby(key, by).await
    }

    async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        self.backend.hget(key, field).await
    }

    async fn hset(&self, key: &str, field: &str, value: String) -> StoreResult<()> {
        self.backend.hset(key, field, value).await
    }

    async fn hdel(&self, key: &str, field: &str) -> StoreResult<()> {
        self.backend.hdel(key, field).await?;
        Ok(())
    }

    async fn hincrby(&self, key: &str, field: &str, by: i64) -> StoreResult<i64> {
        self.backend.hincrby(key, field, by).await
    }

    fn raw_connection(&self) -> &B {
        &self.backend
    }

    fn prefix(&self) -> &str {
        ""
    }

    fn full_prefix(&self) -> String {
        String::new()
    }

    fn mark_key_as_used(&self, key: &str) -> Result<(), DuplicateSchemaKey> {
        self.registry.mark_key_as_used(key)
    }

    fn is_used(&self, key: &str) -> bool {
        self.registry.is_used(key)
    }
}
