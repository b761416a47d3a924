//! API-based embedder using Ollama or OpenAI-compatible endpoints.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use dedup_types::{EmbeddingApi, EmbeddingSettings};

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingProvider};

/// Configuration for the API-based embedder.
#[derive(Debug, Clone)]
pub struct ApiEmbedderConfig {
    /// API flavour
    pub api: EmbeddingApi,

    /// API base URL (e.g., "http://localhost:11434", "https://api.openai.com/v1")
    pub base_url: String,

    /// Model to use (e.g., "nomic-embed-text", "text-embedding-3-small")
    pub model: String,

    /// Bearer token, if the endpoint needs one
    pub api_key: Option<SecretString>,

    /// Request timeout
    pub timeout: Duration,
}

impl ApiEmbedderConfig {
    /// Create config for a local Ollama server.
    pub fn ollama(model: impl Into<String>) -> Self {
        Self {
            api: EmbeddingApi::Ollama,
            base_url: "http://localhost:11434".to_string(),
            model: model.into(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Create config for the OpenAI API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api: EmbeddingApi::OpenAi,
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
            api_key: Some(SecretString::from(api_key.into())),
            timeout: Duration::from_secs(30),
        }
    }

    /// Build from loaded settings.
    pub fn from_settings(settings: &EmbeddingSettings) -> Self {
        Self {
            api: settings.api,
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone().map(SecretString::from),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// API-based embedder implementation.
pub struct ApiEmbedder {
    client: Client,
    config: ApiEmbedderConfig,
}

impl ApiEmbedder {
    /// Create a new API embedder.
    pub fn new(config: ApiEmbedderConfig) -> Result<Self, EmbeddingError> {
        if config.model.trim().is_empty() {
            return Err(EmbeddingError::Config("missing model name".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        match self.config.api {
            EmbeddingApi::Ollama => format!("{}/api/embed", base),
            EmbeddingApi::OpenAi => format!("{}/embeddings", base),
        }
    }

    /// POST the request; non-2xx statuses become errors.
    async fn post<T: Serialize + ?Sized>(
        &self,
        request: &T,
    ) -> Result<reqwest::Response, EmbeddingError> {
        let mut builder = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(key) = &self.config.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key.expose_secret()));
        }

        let response = builder.send().await?;

        if response.status() == 429 {
            return Err(EmbeddingError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api { status, body });
        }

        Ok(response)
    }

    /// Ollama `/api/embed` request.
    async fn embed_ollama(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            input: &'a [String],
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            embeddings: Vec<Vec<f32>>,
        }

        let request = OllamaRequest {
            model: &self.config.model,
            input: texts,
        };
        let body: OllamaResponse = self.post(&request).await?.json().await?;
        Ok(body.embeddings)
    }

    /// OpenAI-compatible `/embeddings` request.
    async fn embed_openai(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        #[derive(Serialize)]
        struct OpenAIRequest<'a> {
            model: &'a str,
            input: &'a [String],
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            data: Vec<OpenAIEmbedding>,
        }

        #[derive(Deserialize)]
        struct OpenAIEmbedding {
            embedding: Vec<f32>,
            index: usize,
        }

        let request = OpenAIRequest {
            model: &self.config.model,
            input: texts,
        };
        let mut body: OpenAIResponse = self.post(&request).await?.json().await?;
        // Entries may come back out of order.
        body.data.sort_by_key(|entry| entry.index);
        Ok(body.data.into_iter().map(|entry| entry.embedding).collect())
    }
}

/// Check a raw provider answer against its request.
fn check_vectors(expected: usize, vectors: &[Vec<f32>]) -> Result<(), EmbeddingError> {
    if vectors.len() != expected {
        return Err(EmbeddingError::CountMismatch {
            expected,
            actual: vectors.len(),
        });
    }
    let Some(first) = vectors.first() else {
        return Ok(());
    };
    if first.is_empty() {
        return Err(EmbeddingError::InvalidResponse(
            "provider returned an empty vector".to_string(),
        ));
    }
    if let Some(ragged) = vectors.iter().find(|v| v.len() != first.len()) {
        return Err(EmbeddingError::DimensionMismatch {
            expected: first.len(),
            actual: ragged.len(),
        });
    }
    Ok(())
}

#[async_trait]
impl EmbeddingProvider for ApiEmbedder {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            count = texts.len(),
            model = %self.config.model,
            "Requesting embeddings"
        );

        let vectors = match self.config.api {
            EmbeddingApi::Ollama => self.embed_ollama(texts).await?,
            EmbeddingApi::OpenAi => self.embed_openai(texts).await?,
        };
        check_vectors(texts.len(), &vectors)?;

        Ok(vectors.into_iter().map(Embedding::new).collect())
    }
}
