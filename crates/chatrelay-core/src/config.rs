//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Paths to all ChatRelay data locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Bundled assets directory (`data/assets/`).
    pub assets: PathBuf,
    /// LLM configuration (`data/llm-config.json`).
    pub llm_config_file: PathBuf,
    /// Sample image used by the local VQA endpoint (`data/assets/test-image.jpg`).
    pub sample_image: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let assets = root.join("assets");
        let paths = Self {
            llm_config_file: root.join("llm-config.json"),
            sample_image: assets.join("test-image.jpg"),
            assets,
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.assets)?;
        Ok(())
    }
}

/// Top-level ChatRelay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// HTTP server port.
    pub port: u16,
    /// Maximum accepted multipart upload size in bytes.
    pub max_upload_bytes: usize,
    /// Data directory paths.
    pub data_paths: DataPaths,
}

const DEFAULT_MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

impl RelayConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let max_upload_bytes = std::env::var("CHATRELAY_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let data_paths = DataPaths::new(data_dir)?;

        Ok(Self {
            port,
            max_upload_bytes,
            data_paths,
        })
    }
}

/// Resolve the data directory: `CHATRELAY_DATA_DIR`, a `data/` directory next
/// to the executable, or `data/` relative to the working directory.
pub fn resolve_data_dir() -> PathBuf {
    std::env::var("CHATRELAY_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_paths_create_directories() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path().join("data")).unwrap();

        assert!(paths.root.exists());
        assert!(paths.assets.exists());
        assert_eq!(paths.sample_image, paths.assets.join("test-image.jpg"));
        assert_eq!(paths.llm_config_file, paths.root.join("llm-config.json"));
    }
}
