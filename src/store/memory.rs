//! Memory Store Module
//!
//! In-process `KvStore` with the same command semantics as Redis.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::store::KvStore;

// == Memory Entry ==
/// A value slot: either a plain string value or a list.
#[derive(Debug, Clone)]
enum Entry {
    Value(Vec<u8>),
    List(Vec<Vec<u8>>),
}

const WRONG_TYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

// == Memory Store ==
/// Thread-safe in-memory key-value store.
///
/// Clones share the same map, so a clone handed to a `Cache` and one kept for
/// `replay` observe each other's writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Length ==
    /// Returns the number of keys currently held.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    /// Returns true if no key is held.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl KvStore for MemoryStore {
    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        debug!(key, bytes = value.len(), "SET");
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), Entry::Value(value.to_vec()));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        debug!(key, "GET");
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(Entry::Value(value)) => Ok(Some(value.clone())),
            Some(Entry::List(_)) => Err(CacheError::StoreRejected(WRONG_TYPE.to_string())),
            None => Ok(None),
        }
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        debug!(key, "INCR");
        let mut entries = self.entries.write().await;
        let current = match entries.get(key) {
            Some(Entry::Value(value)) => std::str::from_utf8(value)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(|| {
                    CacheError::StoreRejected(
                        "ERR value is not an integer or out of range".to_string(),
                    )
                })?,
            Some(Entry::List(_)) => return Err(CacheError::StoreRejected(WRONG_TYPE.to_string())),
            None => 0,
        };

        let next = current.checked_add(1).ok_or_else(|| {
            CacheError::StoreRejected("ERR increment or decrement would overflow".to_string())
        })?;
        entries.insert(key.to_string(), Entry::Value(next.to_string().into_bytes()));
        Ok(next)
    }

    async fn rpush(&self, key: &str, value: &[u8]) -> Result<usize> {
        debug!(key, bytes = value.len(), "RPUSH");
        let mut entries = self.entries.write().await;
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::List(Vec::new()));

        match entry {
            Entry::List(items) => {
                items.push(value.to_vec());
                Ok(items.len())
            }
            Entry::Value(_) => Err(CacheError::StoreRejected(WRONG_TYPE.to_string())),
        }
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        debug!(key, start, stop, "LRANGE");
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(Entry::List(items)) => Ok(match list_bounds(items.len(), start, stop) {
                Some((from, to)) => items[from..=to].to_vec(),
                None => Vec::new(),
            }),
            Some(Entry::Value(_)) => Err(CacheError::StoreRejected(WRONG_TYPE.to_string())),
            None => Ok(Vec::new()),
        }
    }

    async fn flush_all(&self) -> Result<()> {
        let mut entries = self.entries.write().await;
        debug!(keys = entries.len(), "FLUSHALL");
        entries.clear();
        Ok(())
    }
}

// == Range Resolution ==
/// Resolves Redis-style inclusive `start..=stop` indices against a list of
/// `len` elements. Returns `None` when the range selects nothing.
fn list_bounds(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = isize::try_from(len).ok()?;
    let start = if start < 0 { (start + len).max(0) } else { start };
    let stop = if stop < 0 { stop + len } else { stop.min(len - 1) };

    if len == 0 || start >= len || stop < 0 || start > stop {
        return None;
    }
    Some((start as usize, stop as usize))
}
