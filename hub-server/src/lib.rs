//! XQL Hub Server
//!
//! HTTP front end for the detection content catalog: read-only search and
//! taxonomy endpoints, plus the signed webhook that refreshes content.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          XQL HUB                             │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐     ┌──────────────┐     ┌────────────────┐  │
//! │  │  Read API  │     │   Webhook    │     │  Git working   │  │
//! │  │  (Axum)    │     │  /refresh    │────▶│  copy (pull)   │  │
//! │  └─────┬──────┘     └──────┬───────┘     └────────────────┘  │
//! │        │ clone Arc         │ publish                         │
//! │        ▼                   ▼                                 │
//! │              ┌─────────────────────┐                         │
//! │              │   SnapshotStore     │                         │
//! │              └─────────────────────┘                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use xql_hub_core::{RefreshController, SnapshotStore};

pub use config::{Config, LogFormat};
pub use error::{AppError, AppResult};

/// Webhook request bodies above this size are refused
pub const WEBHOOK_BODY_LIMIT: usize = 5 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SnapshotStore>,
    pub refresh: Arc<RefreshController>,
    pub config: Config,
}

impl AppState {
    /// The snapshot store is the one the controller publishes into
    pub fn new(config: Config, refresh: Arc<RefreshController>) -> Self {
        Self {
            store: refresh.store().clone(),
            refresh,
            config,
        }
    }
}

/// Create the main router with all routes
pub fn build_router(state: AppState) -> Router {
    // Read API
    let read_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/search", get(handlers::search::search))
        .route("/api/content/*id", get(handlers::catalog::content))
        .route("/api/filters", get(handlers::catalog::filters))
        .route("/api/content-types", get(handlers::catalog::content_types))
        .route("/api/mitre", get(handlers::catalog::mitre))
        .route("/api/matrix", get(handlers::catalog::matrix))
        .route("/api/refresh/status", get(handlers::webhook::status));

    // Refresh trigger (signature checked by the controller)
    let webhook_routes = Router::new().route(
        "/webhook/refresh",
        post(handlers::webhook::refresh).layer(DefaultBodyLimit::max(WEBHOOK_BODY_LIMIT)),
    );

    Router::new()
        .merge(read_routes)
        .merge(webhook_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
