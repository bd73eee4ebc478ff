//! Namespaced key-value store for Keyspace.
//!
//! This crate holds the key model that typed schemas are built on:
//!
//! - [`Backend`] -- the primitive medium (strings, hashes, atomic counters)
//! - [`RootStore`] -- wraps a backend, encodes values as JSON text and owns
//!   the [`SchemaRegistry`] for everything derived from it
//! - [`Namespace`] -- prepends a prefix to every key and forwards to its
//!   parent; namespaces nest
//! - [`Store`] -- the interface shared by the root and every namespace
//!
//! # Design Rules
//!
//! 1. Prefixes concatenate in derivation order with no separator added.
//! 2. A fully-qualified key can be claimed by at most one schema per root
//!    store; a second claim is a [`DuplicateSchemaKey`] error.
//! 3. The registry only grows. Deleting data never releases a key.
//! 4. Namespaces own no data; closing the root invalidates all of them.
//! 5. Backend errors are propagated unchanged, never retried.

pub mod backend;
pub mod config;
pub mod error;
pub mod memory;
pub mod namespace;
pub mod registry;
pub mod store;

pub use backend::Backend;
pub use config::{BackendKind, StoreConfig};
pub use error::{DuplicateSchemaKey, StoreError, StoreResult};
pub use memory::MemoryBackend;
pub use namespace::Namespace;
pub use registry::SchemaRegistry;
pub use store::{RootStore, Store, StoreExt};
