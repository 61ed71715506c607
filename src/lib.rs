//! Instrumented Cache - random-key value storage over Redis
//!
//! Every store call is counted and its input and output are recorded in the
//! key-value store itself, from where `replay` prints them as a call log.

pub mod cache;
pub mod config;
pub mod documents;
pub mod error;
pub mod replay;
pub mod store;

pub use cache::{Cache, StoredValue, STORE_OPERATION};
pub use config::Config;
pub use documents::{list_all, DocumentCollection, MemoryCollection};
pub use error::{CacheError, Result};
pub use replay::{replay, replay_to, CallLog};
pub use store::{KvStore, MemoryStore, RedisStore};
