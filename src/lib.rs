//! Model Workflows - Checkpoint metadata matching service
//!
//! A lightweight Rust service that matches locally installed model checkpoint
//! files against a periodically refreshed remote metadata dataset, by content
//! hash first with a filename fallback.

pub mod api;
pub mod checkpoints;
pub mod config;
pub mod error;
pub mod hashes;
pub mod matcher;
pub mod metadata;
pub mod metrics;
pub mod storage;

pub use checkpoints::LocalCheckpoint;
pub use config::ServiceConfig;
pub use error::ApiError;
pub use hashes::HashStore;
pub use matcher::match_checkpoints;
pub use metadata::{
    HttpRemoteSource, LatestMarker, MetadataCache, MetadataRecord, MetadataSnapshot, RemoteSource,
};
pub use storage::{FileSystemStorage, StorageBackend};
