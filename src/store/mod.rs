//! Store Module
//!
//! The key-value store the cache delegates to. Durability, networking and
//! per-key atomicity belong to the backend; this module only defines the
//! commands the cache consumes.

mod memory;
mod redis_store;

use std::future::Future;

use crate::error::Result;

pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;

// == Store Trait ==
/// Commands consumed from an external key-value service.
///
/// Implementations guarantee "last write wins" per key and that a list is
/// read back in append order. Nothing else is assumed.
pub trait KvStore: Send + Sync {
    /// Writes `value` under `key`, replacing whatever was there.
    fn set(&self, key: &str, value: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Reads the value under `key`, `None` when the key does not exist.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Increments the integer under `key` by one, creating it at zero first.
    /// Returns the new value.
    fn incr(&self, key: &str) -> impl Future<Output = Result<i64>> + Send;

    /// Appends `value` to the list under `key` and returns the new length.
    fn rpush(&self, key: &str, value: &[u8]) -> impl Future<Output = Result<usize>> + Send;

    /// Returns the list elements between `start` and `stop` inclusive.
    /// Negative indices count from the end, so `(0, -1)` is the whole list.
    fn lrange(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> impl Future<Output = Result<Vec<Vec<u8>>>> + Send;

    /// Drops every key, counter and list.
    fn flush_all(&self) -> impl Future<Output = Result<()>> + Send;
}
