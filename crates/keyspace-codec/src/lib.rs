//! Value codecs for Keyspace.
//!
//! A [`Codec`] is the only place where an untyped payload becomes a typed
//! value. Stores hand codecs a [`serde_json::Value`]; a missing key or hash
//! field arrives as [`Value::Null`](serde_json::Value::Null), and it is up to
//! the codec whether that is acceptable.
//!
//! # Built-in codecs
//!
//! - [`Json`] -- any serde type, strict about shape
//! - [`Optional`] -- wraps another codec, reading `null` as `None`
//! - [`Raw`] -- passes `Value`s through untouched

pub mod codec;
pub mod error;

pub use codec::{Codec, Json, Optional, Raw};
pub use error::{Result, ValidationError};
pub use serde_json::Value;
