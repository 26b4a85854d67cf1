//! Configuration management for askmaggie.
//!
//! Configuration is loaded from `~/.config/askmaggie/config.toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Page the return action falls back to when no `returnUrl` was supplied.
pub const DEFAULT_RETURN_URL: &str = "https://booksbymaggie.com";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Answer backend configuration.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Verse lookup service.
    #[serde(default)]
    pub verses: VerseConfig,
    /// UI preferences.
    #[serde(default)]
    pub ui: UiConfig,
    /// Shared HTTP settings.
    #[serde(default)]
    pub network: NetworkConfig,
}

/// Backend configuration for the answer-generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// OpenAI chat completions API.
    OpenAI {
        /// Model name (default: gpt-4o-mini).
        #[serde(default = "default_openai_model")]
        model: String,
        /// API key (prefer OPENAI_API_KEY env var).
        #[serde(default)]
        api_key: Option<String>,
        /// API base URL.
        #[serde(default = "default_openai_base_url")]
        base_url: String,
    },
    /// Anthropic messages API.
    Anthropic {
        /// Model name (default: claude-3-5-haiku-latest).
        #[serde(default = "default_anthropic_model")]
        model: String,
        /// API key (prefer ANTHROPIC_API_KEY env var).
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default = "default_anthropic_base_url")]
        base_url: String,
    },
    /// Ollama local backend.
    Ollama {
        /// Model name (default: llama3.2:latest).
        #[serde(default = "default_ollama_model")]
        model: String,
        /// Ollama host URL (default: http://localhost:11434).
        #[serde(default = "default_ollama_host")]
        host: String,
    },
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::OpenAI {
            model: default_openai_model(),
            api_key: None,
            base_url: default_openai_base_url(),
        }
    }
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com/v1".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

/// Verse-content service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerseConfig {
    /// Base URL of a bible-api.com compatible service.
    #[serde(default = "default_verse_base_url")]
    pub base_url: String,
    /// Translation identifier passed as `?translation=`.
    #[serde(default = "default_translation")]
    pub translation: String,
}

impl Default for VerseConfig {
    fn default() -> Self {
        Self {
            base_url: default_verse_base_url(),
            translation: default_translation(),
        }
    }
}

fn default_verse_base_url() -> String {
    "https://bible-api.com".to_string()
}

fn default_translation() -> String {
    "web".to_string()
}

/// UI preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Where the return action goes when no `returnUrl` was given.
    #[serde(default = "default_return_url")]
    pub return_url: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            return_url: default_return_url(),
        }
    }
}

fn default_return_url() -> String {
    DEFAULT_RETURN_URL.to_string()
}

/// Shared HTTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

impl NetworkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Get the config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("askmaggie"))
            .context("Could not determine config directory")
    }

    /// Get the config file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the log file path used while the TUI owns the terminal.
    pub fn log_path() -> Result<PathBuf> {
        dirs::cache_dir()
            .map(|p| p.join("askmaggie").join("askmaggie.log"))
            .context("Could not determine cache directory")
    }

    /// Load configuration from the default location, using defaults if not found.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, using defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Get the backend type as a string.
    pub fn backend_type(&self) -> &'static str {
        match &self.backend {
            BackendConfig::OpenAI { .. } => "openai",
            BackendConfig::Anthropic { .. } => "anthropic",
            BackendConfig::Ollama { .. } => "ollama",
        }
    }

    /// Get the model name.
    pub fn model_name(&self) -> &str {
        match &self.backend {
            BackendConfig::OpenAI { model, .. } => model,
            BackendConfig::Anthropic { model, .. } => model,
            BackendConfig::Ollama { model, .. } => model,
        }
    }
}
