//! API request handlers

use super::models::{CheckpointsResponse, HealthResponse, StatusResponse};
use super::routes::AppState;
use crate::error::ApiError;
use crate::{checkpoints, matcher};
use axum::{Json, extract::State, http::StatusCode};

/// GET /health - Service health check
pub async fn health() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now(),
        }),
    )
}

/// GET /metrics - Prometheus metrics
pub async fn metrics(State(state): State<AppState>) -> String {
    state.prometheus_handle.render()
}

/// GET /checkpoints - Resolve metadata records for all local checkpoints
///
/// Hashes any files not seen before, refreshes the metadata snapshot if the
/// remote marker changed, then runs the two-tier match. Any failure in the
/// chain collapses into a bare 400.
pub async fn load_checkpoints(
    State(state): State<AppState>,
) -> Result<Json<CheckpointsResponse>, ApiError> {
    let local = checkpoints::discover(&state.config.checkpoint_dirs);
    crate::metrics::update_checkpoint_count(local.len());

    let hashes = state.hash_store.get_or_compute(&local).await?;
    let snapshot = state.metadata_cache.get_current().await?;
    let matched = matcher::match_checkpoints(&local, &hashes, &snapshot.records);

    tracing::debug!(
        files = local.len(),
        records = snapshot.records.len(),
        matched = matched.len(),
        "Checkpoint metadata resolved"
    );

    Ok(Json(CheckpointsResponse {
        checkpoints: matched,
    }))
}

/// GET /status - Local cache and hash store statistics
pub async fn status(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    let cache = state.metadata_cache.status().await?;

    Ok(Json(StatusResponse {
        hash_entries: state.hash_store.len().await,
        snapshot_present: cache.snapshot_present,
        snapshot_records: cache.record_count,
        snapshot_updated_at: cache.updated_at,
        checkpoint_dirs: state.config.checkpoint_dirs.clone(),
        timestamp: chrono::Utc::now(),
    }))
}
