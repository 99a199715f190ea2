use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod error;
mod models;
mod push;
mod services;
mod storage;

use config::Config;
use push::fcm::FcmClient;
use storage::d1::D1Client;

#[derive(Clone)]
pub struct AppState {
    pub d1: D1Client,
    pub fcm: Option<Arc<FcmClient>>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "locationtracker_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load();
    tracing::info!("Starting server in {} mode", config.server.environment);

    // Cloudflare D1 relay client; credentials are validated per request
    let d1 = D1Client::new(config.cloudflare.clone());

    // Initialize Firebase push client (absence is tolerated; sends then
    // fail per target)
    let fcm = match FcmClient::initialize(&config.firebase) {
        Ok(client) => {
            tracing::info!("Firebase push client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!("Firebase push client unavailable: {}", e);
            None
        }
    };

    // Create app state
    let state = AppState {
        d1,
        fcm,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api::router::create_router(state.clone()))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
