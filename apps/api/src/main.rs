mod cache;
mod config;
mod errors;
mod models;
mod questionnaire;
mod recommender_client;
mod routes;
mod state;
mod viewer;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::cache::{CacheStore, MemoryCacheStore, RedisCacheStore};
use crate::config::Config;
use crate::questionnaire::wizard::WizardRegistry;
use crate::recommender_client::{HttpRecommender, Recommender};
use crate::routes::build_router;
use crate::state::AppState;
use crate::viewer::session::ViewerRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareerCompass API v{}", env!("CARGO_PKG_VERSION"));

    // Result cache: Redis when configured, process memory otherwise
    let cache: Arc<dyn CacheStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisCacheStore::connect(url, config.cache_ttl).await?),
        None => {
            info!("REDIS_URL not set, caching results in memory");
            Arc::new(MemoryCacheStore::new(config.cache_ttl))
        }
    };

    // Recommendation service client
    let http_recommender =
        HttpRecommender::new(&config.recommender_base_url, config.recommender_timeout)?;
    info!(
        "Recommender client initialized (endpoint: {})",
        http_recommender.endpoint()
    );
    let recommender: Arc<dyn Recommender> = Arc::new(http_recommender);

    // Build app state
    let state = AppState {
        config: config.clone(),
        wizards: WizardRegistry::new(config.session_idle_ttl),
        viewers: ViewerRegistry::new(cache, recommender, config.session_idle_ttl),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the questionnaire frontend

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
