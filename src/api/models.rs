//! API response models

use crate::metadata::MetadataRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Response for the checkpoint load endpoint
///
/// Keys are paths relative to the configured checkpoint directories.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckpointsResponse {
    pub checkpoints: BTreeMap<String, MetadataRecord>,
}

/// Service status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub hash_entries: usize,
    pub snapshot_present: bool,
    pub snapshot_records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_updated_at: Option<serde_json::Value>,
    pub checkpoint_dirs: Vec<PathBuf>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
