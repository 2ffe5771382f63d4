use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the collaborative-filtering recommendation service.
    pub recommender_base_url: String,
    /// Optional Redis URL. When unset, results are cached in process memory.
    pub redis_url: Option<String>,
    /// How long cached results live; approximates one browser session.
    pub cache_ttl: Duration,
    /// How long an untouched wizard or results viewer is kept in memory.
    pub session_idle_ttl: Duration,
    /// Outbound request timeout. `None` means the request may wait indefinitely.
    pub recommender_timeout: Option<Duration>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            recommender_base_url: require_env("RECOMMENDER_BASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            redis_url: std::env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
            cache_ttl: Duration::from_secs(
                std::env::var("CACHE_TTL_SECS")
                    .unwrap_or_else(|_| "1800".to_string())
                    .parse::<u64>()
                    .context("CACHE_TTL_SECS must be a whole number of seconds")?,
            ),
            session_idle_ttl: Duration::from_secs(
                std::env::var("SESSION_IDLE_TTL_SECS")
                    .unwrap_or_else(|_| "1800".to_string())
                    .parse::<u64>()
                    .context("SESSION_IDLE_TTL_SECS must be a whole number of seconds")?,
            ),
            recommender_timeout: std::env::var("RECOMMENDER_TIMEOUT_SECS")
                .ok()
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("RECOMMENDER_TIMEOUT_SECS must be a whole number of seconds")?
                .map(Duration::from_secs),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
