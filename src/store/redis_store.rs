//! Redis Store
//!
//! `KvStore` backed by a Redis server through a multiplexed connection manager.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::store::KvStore;

// == Redis Store ==
/// Handle to a Redis database.
///
/// Cloning is cheap; clones share the underlying connection, which
/// reconnects on its own after a dropped link.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl RedisStore {
    // == Constructors ==
    /// Connects to the Redis server at `url` (e.g. `redis://127.0.0.1:6379/0`).
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;
        info!("Connected to Redis at {}", url);
        Ok(Self { connection })
    }

    /// Connects using the host, port and database from `config`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        Self::connect(&config.redis_url()).await
    }
}

impl KvStore for RedisStore {
    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        debug!(key, bytes = value.len(), "SET");
        let mut con = self.connection.clone();
        con.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        debug!(key, "GET");
        let mut con = self.connection.clone();
        Ok(con.get::<_, Option<Vec<u8>>>(key).await?)
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        debug!(key, "INCR");
        let mut con = self.connection.clone();
        Ok(con.incr::<_, _, i64>(key, 1).await?)
    }

    async fn rpush(&self, key: &str, value: &[u8]) -> Result<usize> {
        debug!(key, bytes = value.len(), "RPUSH");
        let mut con = self.connection.clone();
        Ok(con.rpush::<_, _, usize>(key, value).await?)
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        debug!(key, start, stop, "LRANGE");
        let mut con = self.connection.clone();
        Ok(con.lrange::<_, Vec<Vec<u8>>>(key, start, stop).await?)
    }

    async fn flush_all(&self) -> Result<()> {
        // FLUSHDB keeps other logical databases on a shared server intact
        let mut con = self.connection.clone();
        redis::cmd("FLUSHDB").query_async::<_, ()>(&mut con).await?;
        info!("Flushed Redis database");
        Ok(())
    }
}
