//! Session-scoped result cache.
//!
//! Entries are keyed by the browser session and a SHA-256 digest of the full
//! parameter set, so two different questionnaires in the same session never
//! share a slot. `AppState` holds an `Arc<dyn CacheStore>`; the backing store
//! is picked at startup (Redis when `REDIS_URL` is set, memory otherwise).

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::questionnaire::query::RecommendationQuery;

pub mod memory;
pub mod redis_store;

pub use memory::MemoryCacheStore;
pub use redis_store::RedisCacheStore;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: String,
    digest: String,
}

impl CacheKey {
    /// Key for one parameter set within one browser session.
    pub fn for_query(session: Uuid, query: &RecommendationQuery) -> Self {
        Self {
            namespace: session_namespace(session),
            digest: query_digest(query),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[cfg(test)]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// `namespace:digest`
    pub fn as_string(&self) -> String {
        format!("{}:{}", self.namespace, self.digest)
    }
}

/// Namespace holding every cached result for a session.
pub fn session_namespace(session: Uuid) -> String {
    format!("recs:{session}")
}

/// Hex SHA-256 over the canonical query string.
/// Absent and empty parameters hash differently, as they are sent differently.
fn query_digest(query: &RecommendationQuery) -> String {
    hex::encode(Sha256::digest(query.canonical().as_bytes()))
}

/// Injected cache store. Values are opaque strings (JSON arrays of items).
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &CacheKey, value: String) -> Result<(), CacheError>;

    /// Drops every entry under `namespace`.
    async fn clear(&self, namespace: &str) -> Result<(), CacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(skills: &str) -> RecommendationQuery {
        RecommendationQuery {
            skills: Some(skills.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_key_is_stable_for_equal_queries() {
        let session = Uuid::new_v4();
        assert_eq!(
            CacheKey::for_query(session, &query("Go")),
            CacheKey::for_query(session, &query("Go"))
        );
    }

    #[test]
    fn test_different_answers_get_different_keys() {
        let session = Uuid::new_v4();
        let a = CacheKey::for_query(session, &query("Go"));
        let b = CacheKey::for_query(session, &query("Rust"));
        assert_eq!(a.namespace(), b.namespace());
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn test_absent_and_empty_are_distinct() {
        let session = Uuid::new_v4();
        let absent = CacheKey::for_query(session, &RecommendationQuery::default());
        let empty = CacheKey::for_query(session, &query(""));
        assert_ne!(absent, empty);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let q = query("Go");
        let a = CacheKey::for_query(Uuid::new_v4(), &q);
        let b = CacheKey::for_query(Uuid::new_v4(), &q);
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.namespace(), b.namespace());
    }

    #[test]
    fn test_every_parameter_feeds_the_digest() {
        let session = Uuid::new_v4();
        let base = CacheKey::for_query(session, &RecommendationQuery::default());
        let variants = [
            RecommendationQuery { education: Some("phd".into()), ..Default::default() },
            RecommendationQuery { field: Some("CS".into()), ..Default::default() },
            RecommendationQuery { environment: Some("remote".into()), ..Default::default() },
            RecommendationQuery { interests: Some("AI".into()), ..Default::default() },
            RecommendationQuery { values: Some("impact".into()), ..Default::default() },
        ];
        for q in &variants {
            assert_ne!(CacheKey::for_query(session, q).digest(), base.digest());
        }
    }

    #[test]
    fn test_digest_is_hex_sha256() {
        let key = CacheKey::for_query(Uuid::nil(), &RecommendationQuery::default());
        // SHA-256 of the empty canonical string.
        assert_eq!(
            key.digest(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(key.digest().len(), 64);
        assert!(key.digest().chars().all(|c| c.is_ascii_hexdigit()));
        assert!(key
            .as_string()
            .starts_with("recs:00000000-0000-0000-0000-000000000000:"));
    }
}
