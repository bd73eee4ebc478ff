use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, ValidationError};

/// Converts between a typed value and its raw [`Value`] form.
///
/// Implementations must be pure: `read` inspects only its argument and
/// `write` produces a value that `read` accepts.
pub trait Codec: Send + Sync {
    /// The typed value this codec produces and consumes.
    type Value;

    /// Validate `raw` and convert it to a typed value.
    ///
    /// `raw` is [`Value::Null`] when the backing key or field does not exist.
    fn read(&self, raw: &Value) -> Result<Self::Value>;

    /// Convert a typed value to its raw form.
    ///
    /// Fails only for values with no JSON representation.
    fn write(&self, value: &Self::Value) -> Result<Value>;
}

/// Codec for any serde type.
///
/// Strict about shape: `null` is rejected unless `T` itself deserializes
/// from `null` (as `Option<_>` and `()` do).
pub struct Json<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Json<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Json<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Json<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Json<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Json<{}>", std::any::type_name::<T>())
    }
}

impl<T> Codec for Json<T>
where
    T: Serialize + DeserializeOwned,
{
    type Value = T;

    fn read(&self, raw: &Value) -> Result<T> {
        T::deserialize(raw).map_err(|e| {
            ValidationError::new(format!(
                "expected {}: {e}",
                std::any::type_name::<T>()
            ))
        })
    }

    fn write(&self, value: &T) -> Result<Value> {
        Ok(serde_json::to_value(value)?)
    }
}

/// Makes another codec accept a missing value.
///
/// `null` reads as `None`; anything else is handed to the inner codec.
#[derive(Debug, Clone, Default)]
pub struct Optional<C> {
    inner: C,
}

impl<C> Optional<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: Codec> Codec for Optional<C> {
    type Value = Option<C::Value>;

    fn read(&self, raw: &Value) -> Result<Self::Value> {
        match raw {
            Value::Null => Ok(None),
            other => self.inner.read(other).map(Some),
        }
    }

    fn write(&self, value: &Self::Value) -> Result<Value> {
        match value {
            Some(v) => self.inner.write(v),
            None => Ok(Value::Null),
        }
    }
}

/// Identity codec for callers that want the untyped payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct Raw;

impl Codec for Raw {
    type Value = Value;

    fn read(&self, raw: &Value) -> Result<Value> {
        Ok(raw.clone())
    }

    fn write(&self, value: &Value) -> Result<Value> {
        Ok(value.clone())
    }
}
