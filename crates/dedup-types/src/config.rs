//! Configuration loading for message-dedup.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at `<config dir>/message-dedup/config.toml`.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::DedupError;

/// Largest chunk the embedding batcher sends in one provider call.
pub const MAX_EMBED_CHUNK_SIZE: usize = 100;

/// Embedding HTTP API flavour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingApi {
    /// Ollama `/api/embed`
    #[default]
    Ollama,
    /// OpenAI-compatible `/embeddings`
    #[serde(rename = "openai")]
    OpenAi,
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// API flavour
    #[serde(default)]
    pub api: EmbeddingApi,

    /// API base URL
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,

    /// Model name (e.g., "nomic-embed-text" for 768 dims, "mxbai-embed-large" for 1024)
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// API key (loaded from env var, not stored in config file)
    #[serde(default)]
    pub api_key: Option<String>,

    /// HTTP request timeout
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,

    /// Messages per provider call, at most [`MAX_EMBED_CHUNK_SIZE`]
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_embedding_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_embedding_timeout() -> u64 {
    30
}

fn default_chunk_size() -> usize {
    MAX_EMBED_CHUNK_SIZE
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            api: EmbeddingApi::default(),
            base_url: default_embedding_base_url(),
            model: default_embedding_model(),
            api_key: None,
            timeout_secs: default_embedding_timeout(),
            chunk_size: default_chunk_size(),
        }
    }
}

/// Vector store backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Postgres with the pgvector extension
    #[default]
    Postgres,
    /// Process-local store; nothing survives the run
    Memory,
}

/// Vector store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Postgres connection string
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Schema holding the batch tables
    #[serde(default = "default_schema")]
    pub schema: String,
}

fn default_database_url() -> String {
    "postgres://localhost/message_dedup".to_string()
}

fn default_schema() -> String {
    "public".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            database_url: default_database_url(),
            schema: default_schema(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Embedding provider configuration
    #[serde(default)]
    pub embedding: EmbeddingSettings,

    /// Vector store configuration
    #[serde(default)]
    pub store: StoreSettings,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            embedding: EmbeddingSettings::default(),
            store: StoreSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (`<config dir>/message-dedup/config.toml`)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (`DEDUP_*`, nested keys joined by `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, DedupError> {
        let config_dir = ProjectDirs::from("", "", "message-dedup")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())
            .map_err(|e| DedupError::Config(e.to_string()))?
            .set_default("embedding.api", "ollama")
            .map_err(|e| DedupError::Config(e.to_string()))?
            .set_default("embedding.base_url", default_embedding_base_url())
            .map_err(|e| DedupError::Config(e.to_string()))?
            .set_default("embedding.model", default_embedding_model())
            .map_err(|e| DedupError::Config(e.to_string()))?
            .set_default("embedding.timeout_secs", default_embedding_timeout() as i64)
            .map_err(|e| DedupError::Config(e.to_string()))?
            .set_default("embedding.chunk_size", default_chunk_size() as i64)
            .map_err(|e| DedupError::Config(e.to_string()))?
            .set_default("store.backend", "postgres")
            .map_err(|e| DedupError::Config(e.to_string()))?
            .set_default("store.database_url", default_database_url())
            .map_err(|e| DedupError::Config(e.to_string()))?
            .set_default("store.schema", default_schema())
            .map_err(|e| DedupError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: DEDUP_LOG_LEVEL, DEDUP_STORE__DATABASE_URL, DEDUP_EMBEDDING__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("DEDUP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| DedupError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| DedupError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), DedupError> {
        if self.embedding.model.trim().is_empty() {
            return Err(DedupError::Config("embedding.model must be set".to_string()));
        }
        if self.embedding.timeout_secs == 0 {
            return Err(DedupError::Config(
                "embedding.timeout_secs must be > 0".to_string(),
            ));
        }
        if !(1..=MAX_EMBED_CHUNK_SIZE).contains(&self.embedding.chunk_size) {
            return Err(DedupError::Config(format!(
                "embedding.chunk_size must be 1-{}, got {}",
                MAX_EMBED_CHUNK_SIZE, self.embedding.chunk_size
            )));
        }
        if self.store.schema.trim().is_empty() {
            return Err(DedupError::Config("store.schema must be set".to_string()));
        }
        Ok(())
    }

    /// Copy of the settings safe to print: the API key is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.embedding.api_key.is_some() {
            copy.embedding.api_key = Some("***".to_string());
        }
        copy
    }
}
