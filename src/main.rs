//! Portfolio configuration backend
//!
//! Draft/publish store for the site configuration, with SQLite persistence
//! and a TTL read cache in front of the public document.

mod api;
mod auth;
mod cache;
mod config;
mod db;
mod errors;
mod migrators;
mod models;
mod publish;
mod validation;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cache::PublicConfigCache;
use config::Config;
use db::ConfigStore;
use publish::PublishEngine;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub publisher: Arc<PublishEngine>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: ConfigStore, config: Config) -> Self {
        let cache = Arc::new(PublicConfigCache::with_ttl(config.cache_ttl));
        let publisher = PublishEngine::new(store, cache, config.store_timeout);
        Self {
            publisher: Arc::new(publisher),
            config: Arc::new(config),
        }
    }
}

fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let json = config.log_json.then(|| tracing_subscriber::fmt::layer().json());
    let plain = (!config.log_json).then(|| tracing_subscriber::fmt::layer());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json)
        .with(plain)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    init_logging(&config);
    for warning in &config.warnings {
        tracing::warn!("{}", warning);
    }

    tracing::info!("Starting portfolio configuration backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!(
        "Public cache TTL: {:?}, store timeout: {:?}",
        config.cache_ttl,
        config.store_timeout
    );

    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (PORTFOLIO_API_PSK). Admin routes are open!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let store = ConfigStore::new(pool);

    let state = store.get_draft_state().await?;
    tracing::info!(
        "Configuration at revision {}, published version {}",
        state.revision,
        state.published_version
    );

    let bind_addr = config.bind_addr;
    let app = create_router(AppState::new(store, config));

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.api_psk.clone();

    let admin_routes = Router::new()
        .route("/config", get(api::get_admin_config))
        .route("/config/draft", put(api::save_draft))
        .route("/config/draft-state", get(api::get_draft_state))
        .route("/config/publish", post(api::publish))
        .route("/config/validate", post(api::validate_draft))
        .route("/cache/invalidate", post(api::invalidate_cache))
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    let public_routes = Router::new().route("/config", get(api::get_public_config));

    Router::new()
        .nest("/api/admin", admin_routes)
        .nest("/api/public", public_routes)
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
