use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Where a root store lives and which namespace callers start in.
///
/// ```toml
/// url = "memory://"
/// namespace = "myapp:"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend locator. Only `memory://` is understood.
    pub url: String,
    /// Base prefix for every schema declared through the SDK. May be empty.
    pub namespace: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "memory://".into(),
            namespace: String::new(),
        }
    }
}

/// Backends a [`StoreConfig`] can name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
}

impl StoreConfig {
    /// Parse a configuration from TOML text. Missing fields take defaults.
    pub fn from_toml_str(text: &str) -> StoreResult<Self> {
        toml::from_str(text).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Resolve the backend named by `url`.
    pub fn backend_kind(&self) -> StoreResult<BackendKind> {
        match self.url.split_once("://") {
            Some(("memory", _)) => Ok(BackendKind::Memory),
            _ => Err(StoreError::Config(format!(
                "unsupported store url: {}",
                self.url
            ))),
        }
    }
}
