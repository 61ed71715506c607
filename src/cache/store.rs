//! Cache Store Module
//!
//! Stores values under freshly generated keys and reads them back with
//! optional decoding.

use std::fmt::Display;

use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::{Instrumented, StoredValue, STORE_OPERATION};
use crate::error::{CacheError, Result};
use crate::store::KvStore;

// == Cache ==
/// Cache over a key-value store.
///
/// Every `store` call is counted and recorded under [`STORE_OPERATION`], see
/// [`crate::replay`] for reading that history back.
#[derive(Debug)]
pub struct Cache<S> {
    store: S,
}

impl<S: KvStore> Cache<S> {
    // == Constructor ==
    /// Creates a cache over `store`.
    ///
    /// The store is flushed first, dropping all prior keys, counters and
    /// histories in the selected database.
    pub async fn new(store: S) -> Result<Self> {
        store.flush_all().await?;
        info!("Cache initialized on a flushed store");
        Ok(Self { store })
    }

    /// The underlying store, e.g. for replaying the recorded history.
    pub fn backend(&self) -> &S {
        &self.store
    }

    // == Store ==
    /// Writes `value` under a new random key and returns the key.
    ///
    /// Keys are UUID v4 strings; uniqueness is probabilistic and not checked
    /// against the store.
    pub async fn store(&self, value: impl Into<StoredValue>) -> Result<String> {
        let value = value.into();
        Instrumented::new(&self.store, STORE_OPERATION)
            .call((value,), |(value,)| async move {
                let key = Uuid::new_v4().to_string();
                self.store.set(&key, &value.to_bytes()).await?;
                debug!(key = %key, "stored value");
                Ok(key)
            })
            .await
    }

    // == Get ==
    /// Reads the raw bytes under `key`, `None` if the key is absent.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.store.get(key).await
    }

    /// Reads the value under `key` and converts it with `decode`.
    ///
    /// An absent key yields `None` without calling `decode`. Decode errors
    /// are returned as [`CacheError::Decode`].
    pub async fn get_with<T, E, F>(&self, key: &str, decode: F) -> Result<Option<T>>
    where
        F: FnOnce(Vec<u8>) -> std::result::Result<T, E>,
        E: Display,
    {
        match self.store.get(key).await? {
            Some(raw) => decode(raw)
                .map(Some)
                .map_err(|err| CacheError::Decode(err.to_string())),
            None => Ok(None),
        }
    }

    /// Reads the value under `key` as UTF-8 text.
    ///
    /// Unlike [`Cache::get`], an absent key is an error here.
    pub async fn get_str(&self, key: &str) -> Result<String> {
        self.get_with(key, String::from_utf8)
            .await?
            .ok_or_else(|| CacheError::AbsentKey(key.to_string()))
    }

    /// Reads the value under `key` as a decimal integer.
    ///
    /// Falls back to `0` when the key is absent or does not hold a decimal
    /// integer. Only store failures are returned as errors.
    pub async fn get_int(&self, key: &str) -> Result<i64> {
        let parsed = self
            .get_with(key, |raw| {
                String::from_utf8(raw)
                    .map_err(|err| err.to_string())?
                    .trim()
                    .parse::<i64>()
                    .map_err(|err| err.to_string())
            })
            .await;

        match parsed {
            Ok(Some(n)) => Ok(n),
            Ok(None) | Err(CacheError::Decode(_)) => Ok(0),
            Err(err) => Err(err),
        }
    }
}
