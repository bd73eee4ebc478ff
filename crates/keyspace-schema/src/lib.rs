//! Typed schema declarations for Keyspace.
//!
//! Each builder claims one key in the root store's schema registry and
//! returns a capability object exposing only the operations that make sense
//! for its shape:
//!
//! | builder                     | object             | operations                       |
//! |-----------------------------|--------------------|----------------------------------|
//! | [`define_obj`]              | [`Obj`]            | `get`, `set`, `del`              |
//! | [`define_hash_of`]          | [`HashOf`]         | `hget`, `hset`, `hdel`, `del`    |
//! | [`define_counter`]          | [`Counter`]        | `get`, `incrby`, `zero`          |
//! | [`define_hash_of_counters`] | [`HashOfCounters`] | `get`, `incrby`, `zero`, `del`   |
//!
//! Declaring the same fully-qualified key twice, through any path in the
//! namespace tree, fails with [`DuplicateSchemaKey`] before any I/O happens.
//! Data-path failures are reported as [`SchemaError`].

pub mod counter;
pub mod error;
pub mod hash_of;
pub mod obj;

pub use counter::{define_counter, define_hash_of_counters, Counter, HashOfCounters};
pub use error::{SchemaError, SchemaResult};
pub use hash_of::{define_hash_of, HashOf};
pub use keyspace_store::DuplicateSchemaKey;
pub use obj::{define_obj, Obj};

#[cfg(test)]
mod tests {
    use super::*;
    use keyspace_codec::Json;
    use keyspace_store::{MemoryBackend, RootStore, Store, StoreExt};

    #[test]
    fn schema_keys_cannot_be_declared_twice() {
        let kv = RootStore::new(MemoryBackend::new());
        let ns = kv.namespaced_by("redis-schema:test:");

        define_counter(&ns, "foo:bar").unwrap();
        let err = define_counter(&ns, "foo:bar").unwrap_err();
        assert_eq!(err.key, "redis-schema:test:foo:bar");

        let ns2 = ns.namespaced_by("foo:");
        assert!(define_counter(&ns2, "bar").is_err());
    }

    #[test]
    fn builders_share_one_registry_regardless_of_shape() {
        let kv = RootStore::new(MemoryBackend::new());
        define_obj(&kv, "a", Json::<i64>::new()).unwrap();
        assert!(define_hash_of(&kv, "a", Json::<i64>::new()).is_err());
        assert!(define_counter(&kv, "a").is_err());
        assert!(define_hash_of_counters(&kv, "a").is_err());

        define_hash_of_counters(&kv, "b").unwrap();
        assert_eq!(kv.registry().keys(), vec!["a".to_string(), "b".to_string()]);
        assert!(kv.is_used("b"));
    }

    #[test]
    fn separate_roots_do_not_conflict() {
        let first = RootStore::new(MemoryBackend::new());
        let second = RootStore::new(MemoryBackend::new());
        define_counter(&first, "k").unwrap();
        define_counter(&second, "k").unwrap();
    }
}
