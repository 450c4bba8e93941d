//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Paths to the ContactIQ data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Uploaded files awaiting processing (`data/uploads/`).
    pub uploads: PathBuf,
    /// Provider configuration (`data/llm-config.json`).
    pub llm_config_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            uploads: root.join("uploads"),
            llm_config_file: root.join("llm-config.json"),
            root,
        };
        std::fs::create_dir_all(&paths.uploads)?;
        Ok(paths)
    }
}

/// Top-level ContactIQ configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactIqConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Per-request timeout for synchronous image processing, seconds.
    pub sync_ocr_budget_secs: u64,
    /// Overall budget for background image jobs, seconds.
    pub async_ocr_budget_secs: u64,
    /// Largest image accepted on the synchronous path, bytes.
    pub sync_image_limit_bytes: u64,
}

impl ContactIqConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8002);

        let data_paths = DataPaths::new(data_dir)?;

        Ok(Self {
            port,
            data_paths,
            sync_ocr_budget_secs: 15,
            async_ocr_budget_secs: 60,
            sync_image_limit_bytes: 1024 * 1024,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_paths_created() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path()).unwrap();
        assert!(paths.uploads.is_dir());
        assert_eq!(paths.llm_config_file.file_name().unwrap(), "llm-config.json");
    }
}
