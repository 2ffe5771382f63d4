use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::{CacheError, CacheKey, CacheStore};

/// Past this many entries, every `set` also drops whatever has expired.
const SWEEP_THRESHOLD: usize = 256;

/// In-process cache with a fixed time-to-live per entry.
/// Used when no Redis URL is configured, and in tests.
pub struct MemoryCacheStore {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

struct Entry {
    value: String,
    expires_at: Instant,
}

impl MemoryCacheStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let mut entries = self.entries();
        let key = key.as_string();
        let now = Instant::now();

        let expired = match entries.get(&key) {
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(&key);
        }
        Ok(None)
    }

    async fn set(&self, key: &CacheKey, value: String) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = self.entries();
        if entries.len() >= SWEEP_THRESHOLD {
            entries.retain(|_, entry| entry.expires_at > now);
        }
        entries.insert(
            key.as_string(),
            Entry {
                value,
                expires_at: now + self.ttl,
            },
        );
        Ok(())
    }

    async fn clear(&self, namespace: &str) -> Result<(), CacheError> {
        let prefix = format!("{namespace}:");
        self.entries().retain(|k, _| !k.starts_with(&prefix));
        Ok(())
    }
}
