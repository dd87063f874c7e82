//! Prometheus metrics

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Setup Prometheus metrics exporter
/// Returns a handle that can be used to retrieve metrics
pub fn setup_metrics() -> Result<metrics_exporter_prometheus::PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    tracing::info!("Prometheus metrics exporter installed");

    Ok(handle)
}

/// Record a newly computed checkpoint hash
pub fn record_hash_computed() {
    metrics::counter!("model_workflows_hashes_computed_total").increment(1);
}

/// Record a metadata cache hit (marker unchanged, no snapshot download)
pub fn record_cache_hit() {
    metrics::counter!("model_workflows_metadata_cache_hits_total").increment(1);
}

/// Record a successful snapshot refresh
pub fn record_snapshot_refresh(record_count: usize) {
    metrics::counter!("model_workflows_metadata_refreshes_total").increment(1);
    metrics::gauge!("model_workflows_metadata_records").set(record_count as f64);
}

/// Record a failed snapshot download
pub fn record_refresh_failure() {
    metrics::counter!("model_workflows_metadata_refresh_failures_total").increment(1);
}

/// Update the discovered checkpoint count gauge
pub fn update_checkpoint_count(count: usize) {
    metrics::gauge!("model_workflows_checkpoint_files").set(count as f64);
}
