//! High-level SDK for Keyspace.
//!
//! Opens a store from a [`StoreConfig`], derives the configured base
//! namespace and declares typed schemas on it. This is the main entry point
//! for applications; the lower-level crates remain available for custom
//! backends or namespace layouts.
//!
//! ```
//! use keyspace_sdk::{Json, Keyspace};
//!
//! let ks = Keyspace::from_toml_str(r#"namespace = "shop:""#).unwrap();
//! let cart = ks.hash_of("cart", Json::<u32>::new()).unwrap();
//! let orders = ks.counter("orders").unwrap();
//!
//! // Declaring the same key again is a wiring error.
//! assert!(ks.counter("orders").is_err());
//! # drop((cart, orders));
//! ```

pub mod error;
pub mod keyspace;

pub use error::{SdkError, SdkResult};
pub use keyspace::{BaseNamespace, Keyspace};

// Re-export the public API of the lower layers
pub use keyspace_codec::{Codec, Json, Optional, Raw, ValidationError, Value};
pub use keyspace_schema::{
    define_counter, define_hash_of, define_hash_of_counters, define_obj, Counter, HashOf,
    HashOfCounters, Obj, SchemaError, SchemaResult,
};
pub use keyspace_store::{
    Backend, DuplicateSchemaKey, MemoryBackend, Namespace, RootStore, SchemaRegistry, Store,
    StoreConfig, StoreError, StoreExt, StoreResult,
};
