//! API route definitions

use crate::config::ServiceConfig;
use crate::hashes::HashStore;
use crate::metadata::MetadataCache;
use axum::{Router, routing::get};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub hash_store: Arc<HashStore>,
    pub metadata_cache: Arc<MetadataCache>,
    pub prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
}

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health and status
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/status", get(handlers::status))
        // Checkpoint metadata resolution
        .route("/checkpoints", get(handlers::load_checkpoints))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
