//! Key-value cache module
//!
//! This module defines the [`KeyValueStore`] port used for server-side state
//! such as web sessions, together with a Redis-backed implementation and an
//! in-process implementation for local runs and tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{CacheError, CacheResult};

/// String key-value store with optional per-key expiry
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Set a key-value pair, expiring after `ttl_seconds` when given
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> CacheResult<()>;

    /// Get a value by key; expired keys read as missing
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Delete a key. Deleting a missing key is not an error
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Check if the backing store is reachable
    async fn health_check(&self) -> CacheResult<bool>;
}

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL (default: "redis://localhost:6379")
    pub fn from_env() -> CacheResult<Self> {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        if !url.starts_with("redis://") && !url.starts_with("rediss://") {
            return Err(CacheError::Configuration(format!(
                "REDIS_URL must use the redis:// or rediss:// scheme, got {url}"
            )));
        }

        Ok(RedisConfig { url })
    }
}

/// Redis-backed key-value store
#[derive(Clone)]
pub struct RedisPool {
    client: Client,
}

impl RedisPool {
    /// Initialize a new Redis client
    pub async fn new(config: &RedisConfig) -> CacheResult<Self> {
        let client = Client::open(config.url.clone())?;
        info!("Redis client initialized with URL: {}", config.url);
        Ok(RedisPool { client })
    }

    async fn get_connection(&self) -> CacheResult<redis::aio::MultiplexedConnection> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn)
    }
}

#[async_trait]
impl KeyValueStore for RedisPool {
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> CacheResult<()> {
        let mut conn = self.get_connection().await?;

        if let Some(ttl) = ttl_seconds {
            let _: () = conn.set_ex(key, value, ttl).await?;
        } else {
            let _: () = conn.set(key, value).await?;
        }

        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.get_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.get_connection().await?;
        let _: u64 = conn.del(key).await?;
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}

#[derive(Debug)]
struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-process key-value store
///
/// Expired entries are dropped when they are read and swept on every write,
/// so keys that are never read again do not accumulate.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, MemoryEntry>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        entries.values().filter(|e| !e.is_expired(now)).count()
    }

    /// Whether the store holds no live entries
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> CacheResult<()> {
        let now = Instant::now();
        let expires_at = ttl_seconds.map(|ttl| now + Duration::from_secs(ttl));
        let mut entries = self.entries.lock().await;

        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        if entries.len() != before {
            debug!("Swept {} expired keys", before - entries.len());
        }

        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                debug!("Dropping expired key {}", key);
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_memory_set_get_delete() -> CacheResult<()> {
        let store = MemoryStore::new();

        store.set("session:abc", "payload", Some(60)).await?;
        assert_eq!(store.get("session:abc").await?, Some("payload".to_string()));

        store.delete("session:abc").await?;
        assert_eq!(store.get("session:abc").await?, None);

        // Deleting again is a no-op
        assert_ok!(store.delete("session:abc").await);
        Ok(())
    }

    #[tokio::test]
    async fn test_memory_entry_expires() -> CacheResult<()> {
        let store = MemoryStore::new();

        store.set("short", "lived", Some(0)).await?;
        store.set("forever", "kept", None).await?;

        assert_eq!(store.get("short").await?, None);
        assert_eq!(store.get("forever").await?, Some("kept".to_string()));
        assert_eq!(store.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_memory_unread_expired_entries_are_swept() -> CacheResult<()> {
        let store = MemoryStore::new();

        for i in 0..1000 {
            store.set(&format!("session:{i}"), "payload", Some(0)).await?;
        }
        store.set("live", "kept", Some(60)).await?;

        assert_eq!(store.entries.lock().await.len(), 1);
        assert_eq!(store.get("live").await?, Some("kept".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_memory_set_overwrites() -> CacheResult<()> {
        let store = MemoryStore::new();

        store.set("key", "first", None).await?;
        store.set("key", "second", Some(60)).await?;

        assert_eq!(store.get("key").await?, Some("second".to_string()));
        assert!(store.health_check().await?);
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running Redis server"]
    async fn test_redis_set_get_delete() -> CacheResult<()> {
        let config = RedisConfig {
            url: "redis://localhost:6379".to_string(),
        };

        let pool = RedisPool::new(&config).await?;
        assert!(pool.health_check().await?);

        let key = "test_key";
        pool.set(key, "test_value", Some(5)).await?;
        assert_eq!(pool.get(key).await?, Some("test_value".to_string()));

        pool.delete(key).await?;
        assert_eq!(pool.get(key).await?, None);

        Ok(())
    }
}
