//! Configuration loading, validation, and management for the Vitrine
//! assistant gateway.
//!
//! Loads configuration from `vitrine.toml` in the working directory with
//! environment variable overrides. Validates all settings at load time.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The root configuration structure.
///
/// Maps directly to `vitrine.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the chat backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Which backend to use: "openai_compat" or "anthropic"
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Model identifier sent to the backend
    #[serde(default = "default_model")]
    pub model: String,

    /// Override the backend base URL (proxies, self-hosted endpoints)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Sampling temperature — low by default, answers should stay grounded
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per backend reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Client-level timeout for the backend call, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Gateway HTTP settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Knowledge base settings
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Session store settings
    #[serde(default)]
    pub session: SessionConfig,
}

fn default_backend() -> String {
    "openai_compat".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_request_timeout_secs() -> u64 {
    120
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("backend", &self.backend)
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("gateway", &self.gateway)
            .field("knowledge", &self.knowledge)
            .field("session", &self.session)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Exact origin allowed by CORS. None = same-origin only (no CORS layer).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_origin: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8641
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origin: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Directory of plain-text knowledge documents, one per file
    #[serde(default = "default_knowledge_dir")]
    pub dir: PathBuf,
}

fn default_knowledge_dir() -> PathBuf {
    PathBuf::from("knowledge")
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            dir: default_knowledge_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum turns kept per session; oldest evicted first
    #[serde(default = "default_session_cap")]
    pub cap: usize,
}

fn default_session_cap() -> usize {
    20
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cap: default_session_cap(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (`./vitrine.toml`).
    ///
    /// Also checks environment variables:
    /// - `VITRINE_API_KEY` (highest priority), then `OPENAI_API_KEY`,
    ///   then `ANTHROPIC_API_KEY`
    /// - `VITRINE_BACKEND` and `VITRINE_MODEL` override the file values
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(Path::new("vitrine.toml"))?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("VITRINE_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok());
        }

        if let Ok(backend) = std::env::var("VITRINE_BACKEND") {
            config.backend = backend;
        }

        if let Ok(model) = std::env::var("VITRINE_MODEL") {
            config.model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.session.cap < 2 {
            return Err(ConfigError::ValidationError(
                "session cap must hold at least one exchange (cap >= 2)".into(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be greater than zero".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            backend: default_backend(),
            model: default_model(),
            api_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            gateway: GatewayConfig::default(),
            knowledge: KnowledgeConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
