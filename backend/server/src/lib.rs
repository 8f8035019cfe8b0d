//! # Recipes Server
//!
//! Thin HTTP proxy in front of the upstream recipe database.
//!
//! ## Routes
//!
//! - `GET /api/search?query=` free-text search, one upstream call
//! - `GET /api/categories`, `GET /api/areas` filter options
//! - `GET /api/filter/category?query=`, `GET /api/filter/area?query=` one value
//! - `GET /api/filter?categories=a,b&areas=c` any number of values per axis,
//!   merged and deduplicated through the shared per-axis caches
//!
//! ## Errors
//!
//! Always `{"error": "..."}`. Bad input is a 400, an upstream timeout a 504,
//! anything else the upstream got wrong a 502. Aggregation failures also list
//! the axis and every value that failed.
//!
//! ## Environment
//!
//! - `RECIPES_PORT` (1111)
//! - `MEAL_API_BASE`, otherwise built from the `MEAL_API_KEY` secret or the public test key
//! - `UPSTREAM_TIMEOUT_MS` (5000)
//! - `FANOUT_LIMIT` (8)
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::get,
};
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use config::Config;
use error::ServerError;
use routes::{
    area_filter_handler, areas_handler, categories_handler, category_filter_handler,
    filter_handler, search_handler,
};
use state::AppState;

pub async fn start_server() -> Result<(), ServerError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config)?;

    info!("Starting server against {}", state.client.base_url());

    let address = format!("0.0.0.0:{}", state.config.port);
    let app = router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");

    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/search", get(search_handler))
        .route("/api/categories", get(categories_handler))
        .route("/api/areas", get(areas_handler))
        .route("/api/filter", get(filter_handler))
        .route("/api/filter/category", get(category_filter_handler))
        .route("/api/filter/area", get(area_filter_handler))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
