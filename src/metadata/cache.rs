//! Metadata snapshot caching
//!
//! Keeps a local copy of the remote dataset and only re-downloads the full
//! snapshot when the remote version marker changes. Remote failures never
//! fail a request on their own; the most recent locally persisted copy (or
//! an empty snapshot) is served instead.
//!
//! The marker is persisted only after a snapshot download succeeds, so the
//! local marker can never claim a freshness the local snapshot doesn't
//! have. A failed refresh leaves both files untouched and the next request
//! retries.

use super::record::{LatestMarker, MetadataRecord, MetadataSnapshot};
use super::remote::RemoteSource;
use crate::storage::StorageBackend;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Local view of the persisted cache, for the status endpoint
#[derive(Debug, Clone)]
pub struct CacheStatus {
    pub snapshot_present: bool,
    pub record_count: usize,
    pub updated_at: Option<serde_json::Value>,
}

/// Persisted local copy of the remote dataset
pub struct MetadataCache {
    marker_path: PathBuf,
    snapshot_path: PathBuf,
    remote: Arc<dyn RemoteSource>,
    storage: Arc<dyn StorageBackend>,
    /// Serializes refreshes so two requests cannot interleave writes
    refresh_lock: Mutex<()>,
}

impl MetadataCache {
    pub fn new(
        marker_path: PathBuf,
        snapshot_path: PathBuf,
        remote: Arc<dyn RemoteSource>,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            marker_path,
            snapshot_path,
            remote,
            storage,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Return the current snapshot, refreshing the local copy if the remote
    /// version marker changed
    pub async fn get_current(&self) -> Result<MetadataSnapshot> {
        let _guard = self.refresh_lock.lock().await;

        let local_marker = self.load_local_marker().await;

        let remote_marker = match self.remote.fetch_marker().await {
            Ok(marker) => marker,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch remote marker, serving cached snapshot");
                let records = self.load_local_snapshot().await?;
                return Ok(MetadataSnapshot {
                    updated_at: local_marker.and_then(|m| m.updated_at),
                    records,
                });
            }
        };

        let unchanged = local_marker
            .as_ref()
            .is_some_and(|local| local.updated_at == remote_marker.updated_at);

        if unchanged && self.storage.exists(&self.snapshot_path) {
            tracing::debug!("Metadata snapshot up to date, no download");
            crate::metrics::record_cache_hit();
            let records = self.load_local_snapshot().await?;
            return Ok(MetadataSnapshot {
                updated_at: remote_marker.updated_at,
                records,
            });
        }

        self.refresh(remote_marker, local_marker).await
    }

    /// Inspect the persisted cache without touching the network
    pub async fn status(&self) -> Result<CacheStatus> {
        let marker = self.load_local_marker().await;
        let snapshot_present = self.storage.exists(&self.snapshot_path);
        let record_count = if snapshot_present {
            self.load_local_snapshot().await.map(|r| r.len()).unwrap_or(0)
        } else {
            0
        };

        Ok(CacheStatus {
            snapshot_present,
            record_count,
            updated_at: marker.and_then(|m| m.updated_at),
        })
    }

    /// Download the full snapshot and replace the local copy wholesale
    ///
    /// On failure, neither the snapshot nor the marker is written; the
    /// previous copy (or an empty snapshot) is served.
    async fn refresh(
        &self,
        remote_marker: LatestMarker,
        local_marker: Option<LatestMarker>,
    ) -> Result<MetadataSnapshot> {
        tracing::info!(
            local = ?local_marker.as_ref().and_then(|m| m.updated_at.as_ref()),
            remote = ?remote_marker.updated_at,
            "Metadata update detected, downloading snapshot"
        );

        match self.remote.fetch_snapshot().await {
            Ok(records) => {
                let snapshot_json =
                    serde_json::to_string(&records).context("Failed to serialize snapshot")?;
                self.storage.save(&self.snapshot_path, &snapshot_json).await?;

                // Marker written last: it must never get ahead of the snapshot
                let marker_json =
                    serde_json::to_string(&remote_marker).context("Failed to serialize marker")?;
                self.storage.save(&self.marker_path, &marker_json).await?;

                tracing::info!(records = records.len(), "Snapshot downloaded and persisted");
                crate::metrics::record_snapshot_refresh(records.len());

                Ok(MetadataSnapshot {
                    updated_at: remote_marker.updated_at,
                    records,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "Snapshot download failed, falling back to local copy");
                crate::metrics::record_refresh_failure();

                let records = self.load_local_snapshot().await?;
                Ok(MetadataSnapshot {
                    updated_at: local_marker.and_then(|m| m.updated_at),
                    records,
                })
            }
        }
    }

    /// Load the persisted marker; unreadable or unparsable markers count as
    /// absent (they only ever force a re-download)
    async fn load_local_marker(&self) -> Option<LatestMarker> {
        let content = match self.storage.load(&self.marker_path).await {
            Ok(content) => content?,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read local marker");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(marker) => Some(marker),
            Err(e) => {
                tracing::warn!(error = %e, "Local marker is not valid JSON, ignoring");
                None
            }
        }
    }

    /// Load the persisted snapshot; a missing file is an empty snapshot but
    /// a corrupt one is an error
    async fn load_local_snapshot(&self) -> Result<Vec<MetadataRecord>> {
        let content = match self.storage.load(&self.snapshot_path).await? {
            Some(content) => content,
            None => return Ok(Vec::new()),
        };

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse local snapshot: {:?}", self.snapshot_path))
    }
}
