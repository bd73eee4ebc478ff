//! The set of schema keys declared against one root store.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, error};

use crate::error::DuplicateSchemaKey;

/// Fully-qualified keys claimed by schema declarations.
///
/// Owned by a single [`RootStore`](crate::RootStore) and shared by every
/// namespace derived from it, so two declarations anywhere in the namespace
/// tree that resolve to the same key collide here. The set only grows:
/// deleting stored data does not release a key.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    used: Mutex<HashSet<String>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`, failing if it has been claimed before.
    pub fn mark_key_as_used(&self, key: &str) -> Result<(), DuplicateSchemaKey> {
        // Insertion cannot leave the set half-updated, so a poisoned lock is
        // still safe to use.
        let mut used = self.used.lock().unwrap_or_else(PoisonError::into_inner);
        if used.contains(key) {
            error!(key, "schema key declared twice");
            return Err(DuplicateSchemaKey {
                key: key.to_string(),
            });
        }
        used.insert(key.to_string());
        debug!(key, "schema key registered");
        Ok(())
    }

    /// Returns `true` if `key` has been claimed.
    pub fn is_used(&self, key: &str) -> bool {
        self.used
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    /// Number of claimed keys.
    pub fn len(&self) -> usize {
        self.used.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted list of claimed keys.
    pub fn keys(&self) -> Vec<String> {
        let used = self.used.lock().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = used.iter().cloned().collect();
        keys.sort();
        keys
    }
}
