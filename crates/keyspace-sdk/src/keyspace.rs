use keyspace_codec::Codec;
use keyspace_schema::{
    define_counter, define_hash_of, define_hash_of_counters, define_obj, Counter, HashOf,
    HashOfCounters, Obj,
};
use keyspace_store::{MemoryBackend, Namespace, RootStore, StoreConfig, StoreExt};

use crate::error::SdkResult;

/// Schemas declared through a [`Keyspace`] live on its base namespace.
pub type BaseNamespace = Namespace<MemoryBackend>;

/// An opened store plus the namespace configured for it.
#[derive(Debug, Clone)]
pub struct Keyspace {
    config: StoreConfig,
    root: RootStore<MemoryBackend>,
    base: BaseNamespace,
}

impl Keyspace {
    /// Open the store described by `config` and derive its base namespace.
    pub fn open(config: StoreConfig) -> SdkResult<Self> {
        let root = RootStore::open(&config)?;
        let base = root.namespaced_by(config.namespace.clone());
        tracing::info!(url = %config.url, namespace = %config.namespace, "keyspace opened");
        Ok(Self { config, root, base })
    }

    /// Open from TOML configuration text.
    pub fn from_toml_str(text: &str) -> SdkResult<Self> {
        Self::open(StoreConfig::from_toml_str(text)?)
    }

    /// Open an empty in-memory store with no base namespace.
    pub fn in_memory() -> SdkResult<Self> {
        Self::open(StoreConfig::default())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn root(&self) -> &RootStore<MemoryBackend> {
        &self.root
    }

    /// The configured base namespace.
    pub fn namespace(&self) -> &BaseNamespace {
        &self.base
    }

    /// Derive a namespace below the base namespace.
    pub fn namespaced_by(&self, prefix: impl Into<String>) -> BaseNamespace {
        self.base.namespaced_by(prefix)
    }

    // ---- Schema declarations on the base namespace ----

    pub fn obj<C: Codec>(&self, key: &str, codec: C) -> SdkResult<Obj<BaseNamespace, C>> {
        Ok(define_obj(&self.base, key, codec)?)
    }

    pub fn hash_of<C: Codec>(&self, key: &str, codec: C) -> SdkResult<HashOf<BaseNamespace, C>> {
        Ok(define_hash_of(&self.base, key, codec)?)
    }

    pub fn counter(&self, key: &str) -> SdkResult<Counter<BaseNamespace>> {
        Ok(define_counter(&self.base, key)?)
    }

    pub fn hash_of_counters(&self, key: &str) -> SdkResult<HashOfCounters<BaseNamespace>> {
        Ok(define_hash_of_counters(&self.base, key)?)
    }

    /// Close the backend. Every schema object declared on this keyspace
    /// fails with [`StoreError::Closed`](keyspace_store::StoreError::Closed)
    /// afterwards.
    pub async fn close(&self) -> SdkResult<()> {
        self.root.close().await?;
        tracing::debug!(url = %self.config.url, "keyspace closed");
        Ok(())
    }
}
