//! Local checkpoint file discovery
//!
//! Walks the configured checkpoint directories and collects model files by
//! extension. Relative paths are the stable identifiers used in API
//! responses and filename matching; base file names key the hash store.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions recognized as model checkpoints
const CHECKPOINT_EXTENSIONS: &[&str] = &["safetensors", "ckpt", "pt", "pth", "sft", "bin"];

/// A checkpoint file found under one of the configured directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCheckpoint {
    /// Base file name, e.g. "dreamshaper_8.safetensors"
    pub file_name: String,
    /// Path relative to its scan root, e.g. "sd15/dreamshaper_8.safetensors"
    pub relative_path: String,
    /// Absolute path on disk
    pub path: PathBuf,
}

/// Enumerate checkpoint files under the given directories
///
/// Unreadable entries are skipped with a warning rather than failing the
/// whole scan. When the same relative path appears under more than one
/// root, the earlier root wins.
pub fn discover(dirs: &[PathBuf]) -> Vec<LocalCheckpoint> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut found = Vec::new();

    for dir in dirs {
        if !dir.exists() {
            tracing::warn!(dir = ?dir, "Checkpoint directory does not exist, skipping");
            continue;
        }

        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(dir = ?dir, error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() || !is_checkpoint_file(entry.path()) {
                continue;
            }

            let relative_path = entry
                .path()
                .strip_prefix(dir)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .into_owned();

            if !seen.insert(relative_path.clone()) {
                tracing::debug!(path = %relative_path, "Duplicate relative path, keeping first");
                continue;
            }

            found.push(LocalCheckpoint {
                file_name: entry.file_name().to_string_lossy().into_owned(),
                relative_path,
                path: entry.path().to_path_buf(),
            });
        }
    }

    // Stable ordering for responses and logs
    found.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    found
}

fn is_checkpoint_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            CHECKPOINT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}
