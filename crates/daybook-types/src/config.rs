//! Configuration loading for daybook.
//!
//! Layered config: defaults -> config file -> CLI-specified file -> env vars.
//! Config file lives at ~/.config/daybook/config.toml; environment variables
//! use the DAYBOOK_ prefix. CLI flags are applied by the caller on top.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::DaybookError;

/// Chat-model client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    /// Provider name (e.g., "openai")
    #[serde(default = "default_chat_provider")]
    pub provider: String,

    /// Model name (e.g., "gpt-4o-mini")
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// API key (loaded from env var, not stored in config file)
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_chat_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum retries for non-streaming calls
    #[serde(default = "default_chat_max_retries")]
    pub max_retries: u32,
}

fn default_chat_provider() -> String {
    "openai".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_chat_timeout_secs() -> u64 {
    60
}

fn default_chat_max_retries() -> u32 {
    3
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            provider: default_chat_provider(),
            model: default_chat_model(),
            api_key: None,
            base_url: None,
            timeout_secs: default_chat_timeout_secs(),
            max_retries: default_chat_max_retries(),
        }
    }
}

/// Embedding model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// HuggingFace repository for the sentence-transformer model
    #[serde(default = "default_embedding_repo")]
    pub repo_id: String,

    /// Model file cache directory (defaults to the user cache dir)
    #[serde(default)]
    pub cache_dir: Option<String>,
}

fn default_embedding_repo() -> String {
    "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2".to_string()
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            repo_id: default_embedding_repo(),
            cache_dir: None,
        }
    }
}

/// Merge orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeSettings {
    /// Candidate paragraphs requested per memo in rerank mode
    #[serde(default = "default_num_candidates")]
    pub num_candidates: usize,

    /// Upper elaboration bound relative to the memo's sentence count
    #[serde(default = "default_growth_factor")]
    pub growth_factor: f32,
}

fn default_num_candidates() -> usize {
    3
}

fn default_growth_factor() -> f32 {
    1.5
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            num_candidates: default_num_candidates(),
            growth_factor: default_growth_factor(),
        }
    }
}

impl MergeSettings {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.num_candidates == 0 {
            return Err("num_candidates must be > 0".to_string());
        }
        if self.growth_factor < 1.0 {
            return Err(format!(
                "growth_factor must be >= 1.0, got {}",
                self.growth_factor
            ));
        }
        Ok(())
    }
}

/// Main application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// gRPC server port
    #[serde(default = "default_grpc_port")]
    pub grpc_port: u16,

    /// gRPC server host
    #[serde(default = "default_grpc_host")]
    pub grpc_host: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Chat-model client configuration
    #[serde(default)]
    pub chat: ChatSettings,

    /// Embedding model configuration
    #[serde(default)]
    pub embedding: EmbeddingSettings,

    /// Merge orchestrator configuration
    #[serde(default)]
    pub merge: MergeSettings,
}

fn default_grpc_port() -> u16 {
    50071
}

fn default_grpc_host() -> String {
    "0.0.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grpc_port: default_grpc_port(),
            grpc_host: default_grpc_host(),
            log_level: default_log_level(),
            chat: ChatSettings::default(),
            embedding: EmbeddingSettings::default(),
            merge: MergeSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/daybook/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (DAYBOOK_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, DaybookError> {
        let config_dir = ProjectDirs::from("", "", "daybook")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("grpc_port", default_grpc_port() as i64)
            .map_err(|e| DaybookError::Config(e.to_string()))?
            .set_default("grpc_host", default_grpc_host())
            .map_err(|e| DaybookError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| DaybookError::Config(e.to_string()))?
            .set_default("chat.provider", default_chat_provider())
            .map_err(|e| DaybookError::Config(e.to_string()))?
            .set_default("chat.model", default_chat_model())
            .map_err(|e| DaybookError::Config(e.to_string()))?
            .set_default("embedding.repo_id", default_embedding_repo())
            .map_err(|e| DaybookError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: DAYBOOK_GRPC_PORT, DAYBOOK_CHAT_MODEL, DAYBOOK_CHAT_API_KEY, etc.
        builder = builder.add_source(
            Environment::with_prefix("DAYBOOK")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| DaybookError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| DaybookError::Config(e.to_string()))?;

        settings.merge.validate().map_err(DaybookError::Config)?;

        Ok(settings)
    }

    /// Get the socket address for the gRPC server.
    pub fn grpc_addr(&self) -> String {
        format!("{}:{}", self.grpc_host, self.grpc_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.grpc_port, 50071);
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.merge.num_candidates, 3);
        assert!((settings.merge.growth_factor - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_merge_settings_validation() {
        let mut merge = MergeSettings::default();
        assert!(merge.validate().is_ok());

        merge.num_candidates = 0;
        assert!(merge.validate().is_err());

        merge.num_candidates = 3;
        merge.growth_factor = 0.5;
        assert!(merge.validate().is_err());
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "grpc_port = 6000\n[merge]\nnum_candidates = 5\n",
        )
        .unwrap();

        let settings = Settings::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(settings.grpc_port, 6000);
        assert_eq!(settings.merge.num_candidates, 5);
    }

    #[test]
    fn test_grpc_addr_format() {
        let settings = Settings::default();
        assert_eq!(settings.grpc_addr(), "0.0.0.0:50071");
    }
}
