//! Remote metadata dataset handling
//!
//! Provides functionality for:
//! - Fetching the remote version marker and gzip-compressed snapshot
//! - Caching the snapshot locally and detecting staleness
//! - Wire types for markers and records

pub mod cache;
pub mod record;
pub mod remote;

pub use cache::{CacheStatus, MetadataCache};
pub use record::{LatestMarker, MetadataRecord, MetadataSnapshot};
pub use remote::{HttpRemoteSource, RemoteError, RemoteSource};
