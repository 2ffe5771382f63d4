//! # Redis
//!
//! Shared cache for deployments running more than one API instance.
//!
//! ## Layout
//!
//! - `compass:{namespace}:{digest}`: JSON array of items, `EX` = session TTL
//! - `compass:{namespace}:index`: set of the entry keys above, so a session
//!   can be cleared without `KEYS`/`SCAN`
//!
//! Both keys are written in one `MULTI` pipeline and share the same TTL.

use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, Client};
use tracing::{debug, info};

use super::{CacheError, CacheKey, CacheStore};

const KEY_PREFIX: &str = "compass";

#[derive(Clone)]
pub struct RedisCacheStore {
    connection: ConnectionManager,
    ttl_secs: u64,
}

impl RedisCacheStore {
    pub async fn connect(redis_url: &str, ttl: Duration) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        let connection = client.get_connection_manager().await?;
        info!("Redis cache connected");

        Ok(Self {
            connection,
            ttl_secs: ttl.as_secs().max(1),
        })
    }

    fn entry_key(key: &CacheKey) -> String {
        format!("{KEY_PREFIX}:{}", key.as_string())
    }

    fn index_key(namespace: &str) -> String {
        format!("{KEY_PREFIX}:{namespace}:index")
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let mut con = self.connection.clone();
        let value = redis::cmd("GET")
            .arg(Self::entry_key(key))
            .query_async::<_, Option<String>>(&mut con)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &CacheKey, value: String) -> Result<(), CacheError> {
        let mut con = self.connection.clone();
        let entry_key = Self::entry_key(key);
        let index_key = Self::index_key(key.namespace());

        redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(&entry_key)
            .arg(value)
            .arg("EX")
            .arg(self.ttl_secs)
            .ignore()
            .cmd("SADD")
            .arg(&index_key)
            .arg(&entry_key)
            .ignore()
            .cmd("EXPIRE")
            .arg(&index_key)
            .arg(self.ttl_secs)
            .ignore()
            .query_async::<_, ()>(&mut con)
            .await?;

        debug!("Cached {entry_key} for {}s", self.ttl_secs);
        Ok(())
    }

    async fn clear(&self, namespace: &str) -> Result<(), CacheError> {
        let mut con = self.connection.clone();
        let index_key = Self::index_key(namespace);

        let mut keys: Vec<String> = redis::cmd("SMEMBERS")
            .arg(&index_key)
            .query_async(&mut con)
            .await?;
        keys.push(index_key);

        redis::cmd("DEL")
            .arg(&keys)
            .query_async::<_, ()>(&mut con)
            .await?;

        debug!("Cleared {} cache keys under {namespace}", keys.len() - 1);
        Ok(())
    }
}
