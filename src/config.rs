//! Configuration structures and loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Main service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub api_port: u16,

    /// Directory holding the persisted hash store, version marker and
    /// snapshot files
    pub data_dir: PathBuf,

    /// Directories scanned for locally installed checkpoint files
    pub checkpoint_dirs: Vec<PathBuf>,

    /// URL of the remote "latest" version marker document
    pub latest_url: String,

    /// URL of the gzip-compressed full snapshot
    pub snapshot_url: String,

    pub request_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            data_dir: default_data_dir(),
            checkpoint_dirs: Vec::new(),
            latest_url: default_latest_url(),
            snapshot_url: default_snapshot_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content).context("Failed to parse TOML config")?
        } else {
            Self::default()
        };

        // Environment variable overrides
        if let Ok(port) = std::env::var("MODEL_WORKFLOWS_API_PORT") {
            config.api_port = port
                .parse()
                .context("Invalid MODEL_WORKFLOWS_API_PORT value")?;
        }
        if let Ok(data_dir) = std::env::var("MODEL_WORKFLOWS_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(dirs) = std::env::var("MODEL_WORKFLOWS_CHECKPOINT_DIRS") {
            config.checkpoint_dirs = std::env::split_paths(&dirs).collect();
        }
        if let Ok(url) = std::env::var("MODEL_WORKFLOWS_LATEST_URL") {
            config.latest_url = url;
        }
        if let Ok(url) = std::env::var("MODEL_WORKFLOWS_SNAPSHOT_URL") {
            config.snapshot_url = url;
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Port range validation
        if self.api_port < 1024 {
            anyhow::bail!("API port must be >= 1024 (got {})", self.api_port);
        }

        if self.latest_url.is_empty() || self.snapshot_url.is_empty() {
            anyhow::bail!("Remote dataset URLs cannot be empty");
        }

        let mut seen = HashSet::new();
        for dir in &self.checkpoint_dirs {
            if !seen.insert(dir) {
                anyhow::bail!("Duplicate checkpoint directory: {:?}", dir);
            }
        }

        // Ensure data directory exists or can be created
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Cannot create data directory: {:?}", self.data_dir))?;
        }

        Ok(())
    }

    /// Path of the persisted file-name -> hash mapping
    pub fn hash_store_path(&self) -> PathBuf {
        self.data_dir.join("hashes.json")
    }

    /// Path of the persisted remote version marker
    pub fn marker_path(&self) -> PathBuf {
        self.data_dir.join("latest.json")
    }

    /// Path of the persisted decompressed snapshot
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("checkpoints.json")
    }
}

// Default functions
fn default_api_port() -> u16 {
    9400
}
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("model-workflows"))
        .unwrap_or_else(|| PathBuf::from("/tmp/model-workflows"))
}
fn default_latest_url() -> String {
    "https://raw.githubusercontent.com/shinich39/civitai-model-json/refs/heads/main/dist/latest.json"
        .to_string()
}
fn default_snapshot_url() -> String {
    "https://raw.githubusercontent.com/shinich39/civitai-model-json/refs/heads/main/dist/checkpoints.json.gz"
        .to_string()
}
fn default_request_timeout() -> u64 {
    30
}
