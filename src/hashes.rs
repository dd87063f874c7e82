//! Persistent checkpoint hash store
//!
//! Maps base file names to uppercase SHA-256 hex digests. Entries are
//! computed lazily on first encounter and never mutated afterwards; the
//! file content is assumed immutable. The map is persisted after each new
//! computation rather than batched, so a crash mid-run loses at most one
//! entry's worth of hashing work.

use crate::checkpoints::LocalCheckpoint;
use crate::storage::StorageBackend;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

const HASH_READ_BUF_SIZE: usize = 1 << 20;

/// Persisted file-name -> SHA-256 mapping
pub struct HashStore {
    path: PathBuf,
    storage: Arc<dyn StorageBackend>,
    entries: RwLock<BTreeMap<String, String>>,
}

impl HashStore {
    /// Open the store, loading any previously persisted entries
    pub async fn open(path: PathBuf, storage: Arc<dyn StorageBackend>) -> Result<Self> {
        let entries = match storage.load(&path).await? {
            Some(content) => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse hash store: {:?}", path))?,
            None => BTreeMap::new(),
        };

        tracing::debug!(path = ?path, entries = entries.len(), "Hash store opened");

        Ok(Self {
            path,
            storage,
            entries: RwLock::new(entries),
        })
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Look up a stored hash by file name
    pub async fn get(&self, file_name: &str) -> Option<String> {
        self.entries.read().await.get(file_name).cloned()
    }

    /// Resolve hashes for the given checkpoints, computing and persisting
    /// any that are missing
    ///
    /// An unreadable checkpoint file fails the whole call; there is no
    /// partial success contract.
    pub async fn get_or_compute(
        &self,
        checkpoints: &[LocalCheckpoint],
    ) -> Result<HashMap<String, String>> {
        let mut resolved = HashMap::with_capacity(checkpoints.len());

        for checkpoint in checkpoints {
            let existing = self.entries.read().await.get(&checkpoint.file_name).cloned();

            let hash = match existing {
                Some(hash) => hash,
                None => {
                    tracing::info!(file = %checkpoint.file_name, "Hash not found, computing");
                    let started = std::time::Instant::now();

                    let hash = compute_file_hash(checkpoint.path.clone()).await?;

                    tracing::info!(
                        file = %checkpoint.file_name,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Checkpoint hashed"
                    );
                    crate::metrics::record_hash_computed();

                    // Lock held across the save so concurrent additions
                    // cannot interleave stale writes of the store file
                    let mut entries = self.entries.write().await;
                    entries.insert(checkpoint.file_name.clone(), hash.clone());
                    let content = serde_json::to_string_pretty(&*entries)
                        .context("Failed to serialize hash store")?;
                    self.storage.save(&self.path, &content).await?;
                    hash
                }
            };

            resolved.insert(checkpoint.file_name.clone(), hash);
        }

        Ok(resolved)
    }
}

/// Read the whole file and produce an uppercase SHA-256 hex digest
///
/// Runs on the blocking pool; checkpoint files are typically multi-gigabyte.
async fn compute_file_hash(path: PathBuf) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open checkpoint: {}", path.display()))?;
        let mut reader = std::io::BufReader::with_capacity(HASH_READ_BUF_SIZE, file);
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; HASH_READ_BUF_SIZE];

        loop {
            let n = reader
                .read(&mut buf)
                .with_context(|| format!("Failed to read checkpoint: {}", path.display()))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }

        Ok(format!("{:X}", hasher.finalize()))
    })
    .await
    .context("Hashing task panicked")?
}
