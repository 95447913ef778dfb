//! LLM endpoint configuration persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Stored LLM configuration (persisted to llm-config.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Model used for prompts carrying an image. Falls back to `model`.
    #[serde(default)]
    pub vision_model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Timeout for the single-shot upstream call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Path to config file for saving.
    #[serde(skip)]
    pub config_path: PathBuf,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_model() -> String {
    DEFAULT_MODEL.into()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_max_tokens() -> usize {
    2048
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: None,
            model: DEFAULT_MODEL.into(),
            vision_model: None,
            temperature: 0.7,
            max_tokens: 2048,
            request_timeout_secs: 120,
            config_path: PathBuf::new(),
        }
    }
}

impl LlmConfig {
    /// Load config from file, falling back to env vars and defaults.
    pub fn load(config_path: &Path) -> Self {
        let mut config: LlmConfig = std::fs::read_to_string(config_path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();

        config.config_path = config_path.to_path_buf();

        // Env vars as fallback
        if config.api_key.is_none() {
            config.api_key = std::env::var("CHATRELAY_API_KEY")
                .or_else(|_| std::env::var("DEEPSEEK_API_KEY"))
                .ok();
        }
        if let Ok(url) = std::env::var("CHATRELAY_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(model) = std::env::var("CHATRELAY_MODEL") {
            config.model = model;
        }
        if config.vision_model.is_none() {
            config.vision_model = std::env::var("CHATRELAY_VISION_MODEL").ok();
        }

        config
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(&self.config_path, json)?;
        info!("Saved LLM config to {}", self.config_path.display());
        Ok(())
    }

    /// Whether an API key is available.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Model to use for prompts carrying an image.
    pub fn vision_model(&self) -> &str {
        self.vision_model.as_deref().unwrap_or(&self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = LlmConfig::load(&dir.path().join("llm-config.json"));

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.vision_model(), DEFAULT_MODEL);
        assert_eq!(config.max_tokens, 2048);
    }

    #[test]
    fn load_merges_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("llm-config.json");
        std::fs::write(
            &path,
            r#"{"api_key": "sk-test", "vision_model": "qwen-vl-plus"}"#,
        )
        .unwrap();

        let config = LlmConfig::load(&path);
        assert!(config.is_configured());
        assert_eq!(config.vision_model(), "qwen-vl-plus");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.config_path, path);
    }

    #[test]
    fn save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("llm-config.json");

        let config = LlmConfig {
            api_key: Some("sk-test".into()),
            model: "deepseek-reasoner".into(),
            config_path: path.clone(),
            ..Default::default()
        };
        config.save().unwrap();

        let loaded = LlmConfig::load(&path);
        assert_eq!(loaded.model, "deepseek-reasoner");
        assert_eq!(loaded.api_key.as_deref(), Some("sk-test"));
    }
}
