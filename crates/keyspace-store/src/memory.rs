//! In-memory backend for tests and embedding.
//!
//! [`MemoryBackend`] keeps every key in a `HashMap` behind a `RwLock` and
//! mimics the Redis commands the store layer relies on: string values,
//! string-valued hashes, atomic integer increments and per-key expiry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use crate::backend::Backend;
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone)]
enum Slot {
    Str(String),
    Hash(HashMap<String, String>),
}

#[derive(Debug, Clone)]
struct Entry {
    slot: Slot,
    expires_at: Option<Instant>,
}

impl Entry {
    fn string(value: String, expires_at: Option<Instant>) -> Self {
        Self {
            slot: Slot::Str(value),
            expires_at,
        }
    }

    fn hash() -> Self {
        Self {
            slot: Slot::Hash(HashMap::new()),
            expires_at: None,
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

type Entries = HashMap<String, Entry>;

/// In-memory, HashMap-based backend.
///
/// Expired keys are invisible to readers. They are reclaimed by the next
/// write that touches them, or all at once by [`purge_expired`](Self::purge_expired),
/// which [`len`](Self::len) and [`keys`](Self::keys) run first. Data is lost
/// when the backend is dropped.
pub struct MemoryBackend {
    entries: RwLock<Entries>,
    closed: AtomicBool,
}

impl MemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Drop every expired key and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut map = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = map.len();
        map.retain(|_, e| e.is_live(now));
        let purged = before - map.len();
        if purged > 0 {
            debug!(purged, "reclaimed expired keys");
        }
        purged
    }

    /// Number of live keys. Expired keys are purged first.
    pub fn len(&self) -> usize {
        self.purge_expired();
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no live key is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted list of all live keys. Expired keys are purged first.
    pub fn keys(&self) -> Vec<String> {
        self.purge_expired();
        let map = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Remaining time-to-live of `key`, if it is live and has an expiry.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let map = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        map.get(key)
            .filter(|e| e.is_live(now))
            .and_then(|e| e.expires_at)
            .map(|at| at.saturating_duration_since(now))
    }

    /// Remove every key.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Returns `true` once [`Backend::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Entries>> {
        self.ensure_open()?;
        self.entries
            .read()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Entries>> {
        self.ensure_open()?;
        self.entries
            .write()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("key_count", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Drop `key` if it has expired, so the caller sees it as missing.
fn reclaim_expired(map: &mut Entries, key: &str, now: Instant) {
    if map.get(key).is_some_and(|e| !e.is_live(now)) {
        map.remove(key);
        debug!(key, "reclaimed expired key");
    }
}

fn live<'a>(map: &'a Entries, key: &str) -> Option<&'a Entry> {
    map.get(key).filter(|e| e.is_live(Instant::now()))
}

fn parse_integer(key: &str, raw: &str) -> StoreResult<i64> {
    raw.parse::<i64>().map_err(|_| StoreError::NotAnInteger {
        key: key.to_string(),
    })
}

fn add(key: &str, current: i64, by: i64) -> StoreResult<i64> {
    current.checked_add(by).ok_or_else(|| StoreError::Overflow {
        key: key.to_string(),
    })
}

fn wrong_type(key: &str, expected: &'static str) -> StoreError {
    StoreError::WrongType {
        key: key.to_string(),
        expected,
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let map = self.read()?;
        match live(&map, key).map(|e| &e.slot) {
            None => Ok(None),
            Some(Slot::Str(s)) => Ok(Some(s.clone())),
            Some(Slot::Hash(_)) => Err(wrong_type(key, "string")),
        }
    }

    async fn set(&self, key: &str, value: String, expiry: Option<Duration>) -> StoreResult<()> {
        if expiry.is_some_and(|d| d.is_zero()) {
            return Err(StoreError::InvalidExpiry {
                key: key.to_string(),
            });
        }
        let mut map = self.write()?;
        let expires_at = expiry.map(|d| Instant::now() + d);
        map.insert(key.to_string(), Entry::string(value, expires_at));
        Ok(())
    }

    async fn del(&self, key: &str) -> StoreResult<bool> {
        let mut map = self.write()?;
        reclaim_expired(&mut map, key, Instant::now());
        Ok(map.remove(key).is_some())
    }

    async fn incrby(&self, key: &str, by: i64) -> StoreResult<i64> {
        let mut map = self.write()?;
        reclaim_expired(&mut map, key, Instant::now());
        match map.get_mut(key) {
            None => {
                map.insert(key.to_string(), Entry::string(by.to_string(), None));
                Ok(by)
            }
            Some(entry) => match &mut entry.slot {
                Slot::Str(s) => {
                    let next = add(key, parse_integer(key, s)?, by)?;
                    *s = next.to_string();
                    Ok(next)
                }
                Slot::Hash(_) => Err(wrong_type(key, "string")),
            },
        }
    }

    async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        let map = self.read()?;
        match live(&map, key).map(|e| &e.slot) {
            None => Ok(None),
            Some(Slot::Hash(h)) => Ok(h.get(field).cloned()),
            Some(Slot::Str(_)) => Err(wrong_type(key, "hash")),
        }
    }

    async fn hset(&self, key: &str, field: &str, value: String) -> StoreResult<()> {
        let mut map = self.write()?;
        reclaim_expired(&mut map, key, Instant::now());
        let entry = map.entry(key.to_string()).or_insert_with(Entry::hash);
        match &mut entry.slot {
            Slot::Hash(h) => {
                h.insert(field.to_string(), value);
                Ok(())
            }
            Slot::Str(_) => Err(wrong_type(key, "hash")),
        }
    }

    async fn hdel(&self, key: &str, field: &str) -> StoreResult<bool> {
        let mut map = self.write()?;
        reclaim_expired(&mut map, key, Instant::now());
        let (removed, now_empty) = match map.get_mut(key).map(|e| &mut e.slot) {
            None => return Ok(false),
            Some(Slot::Hash(h)) => (h.remove(field).is_some(), h.is_empty()),
            Some(Slot::Str(_)) => return Err(wrong_type(key, "hash")),
        };
        // An empty hash is the same as no hash.
        if now_empty {
            map.remove(key);
        }
        Ok(removed)
    }

    async fn hincrby(&self, key: &str, field: &str, by: i64) -> StoreResult<i64> {
        let mut map = self.write()?;
        reclaim_expired(&mut map, key, Instant::now());
        let entry = map.entry(key.to_string()).or_insert_with(Entry::hash);
        let Slot::Hash(h) = &mut entry.slot else {
            return Err(wrong_type(key, "hash"));
        };
        let next = match h.get(field) {
            None => by,
            Some(raw) => add(key, parse_integer(key, raw)?, by)?,
        };
        h.insert(field.to_string(), next.to_string());
        Ok(next)
    }

    async fn close(&self) -> StoreResult<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!("memory backend closed");
        }
        Ok(())
    }
}
