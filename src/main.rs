mod routes;
mod controllers;
mod services;
mod models;
mod api_docs;
mod shared_state;
mod config;
mod error;

use std::net::SocketAddr;
use axum::{Router, routing::get, response::Html};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_scalar::Scalar;
use crate::routes::estimate_routes::api_routes;
use crate::api_docs::ApiDoc;
use crate::shared_state::{AppState, SharedState};
use crate::config::Config;

const CONFIG_PATH_ENV: &str = "SOLAR_ESTIMATOR_CONFIG";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Load configuration
    let config_path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load {}: {}", config_path, e);
            std::process::exit(1);
        }
    };
    info!(
        "Configuration loaded from {} (offline mode: {}, reference year: {})",
        config_path, config.offline_mode, config.providers.reference_year
    );

    // 2. Initialize shared state and providers
    let state = match AppState::new(&config) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    // 3. Start Axum HTTP server
    let server_port = config.server.port;
    let shared = SharedState {
        app: state,
        config,
    };
    let app = Router::new()
        .nest("/api", api_routes(shared))
        .route("/scalar", get(|| async {
            Html(Scalar::new(ApiDoc::openapi()).to_html())
        }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], server_port));
    info!("API Server listening on http://{}", addr);
    info!("Scalar UI: http://{}/scalar", addr);

    if let Err(e) = axum_server::bind(addr)
        .serve(app.into_make_service())
        .await
    {
        error!("HTTP server error: {}", e);
        std::process::exit(1);
    }
}
