//! Remote dataset access
//!
//! The `RemoteSource` trait is the seam between the cache logic and the
//! network, so tests can drive the cache with stub datasets. The production
//! implementation fetches the marker document and the gzip-compressed
//! snapshot over HTTP.

use super::record::{LatestMarker, MetadataRecord};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use std::io::Read;
use std::time::Duration;

/// Errors from the remote dataset endpoints
///
/// Callers distinguish "no fresh data" (any of these, logged and tolerated)
/// from local I/O failures, which surface separately.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gzip decompression failed: {0}")]
    Gzip(#[source] std::io::Error),

    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Source of the remote version marker and snapshot
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch the small "latest" marker document
    async fn fetch_marker(&self) -> Result<LatestMarker, RemoteError>;

    /// Fetch and decompress the full snapshot
    async fn fetch_snapshot(&self) -> Result<Vec<MetadataRecord>, RemoteError>;
}

/// Production remote source over HTTP
pub struct HttpRemoteSource {
    client: reqwest::Client,
    latest_url: String,
    snapshot_url: String,
}

impl HttpRemoteSource {
    pub fn new(
        latest_url: String,
        snapshot_url: String,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            latest_url,
            snapshot_url,
        })
    }
}

#[async_trait]
impl RemoteSource for HttpRemoteSource {
    async fn fetch_marker(&self) -> Result<LatestMarker, RemoteError> {
        let body = self
            .client
            .get(&self.latest_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_snapshot(&self) -> Result<Vec<MetadataRecord>, RemoteError> {
        let compressed = self
            .client
            .get(&self.snapshot_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        tracing::debug!(
            compressed_bytes = compressed.len(),
            "Decompressing snapshot payload"
        );

        decode_snapshot(&compressed)
    }
}

/// Decompress and parse a gzip-compressed JSON array of records
fn decode_snapshot(compressed: &[u8]) -> Result<Vec<MetadataRecord>, RemoteError> {
    let mut decoder = GzDecoder::new(compressed);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(RemoteError::Gzip)?;

    Ok(serde_json::from_slice(&decompressed)?)
}
