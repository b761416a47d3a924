//! Command implementations for the dedup daemon.
//!
//! Handles:
//! - run: Load config, build embedder and store, deduplicate one batch
//! - prepare: Create the pgvector table for a batch target
//! - config: Print the resolved settings

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{error, info};

use dedup_embeddings::{ApiEmbedder, ApiEmbedderConfig, EmbeddingProvider};
use dedup_service::BatchDeduplicator;
use dedup_store::{InMemoryStore, PgVectorStore, VectorStore};
use dedup_types::{BatchRequest, BatchResponse, Settings, StoreBackend};

/// Flags that take precedence over every config source.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub backend: Option<StoreBackend>,
    pub database_url: Option<String>,
}

/// Load settings and apply CLI overrides (defaults -> file -> env -> CLI).
pub fn load_settings(config_path: Option<&str>, overrides: &CliOverrides) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    apply_overrides(&mut settings, overrides);
    Ok(settings)
}

fn apply_overrides(settings: &mut Settings, overrides: &CliOverrides) {
    if let Some(log_level) = &overrides.log_level {
        settings.log_level = log_level.clone();
    }
    if let Some(backend) = overrides.backend {
        settings.store.backend = backend;
    }
    if let Some(database_url) = &overrides.database_url {
        settings.store.database_url = database_url.clone();
    }
}

/// Install the global subscriber. Logs go to stderr; stdout is reserved
/// for the response JSON.
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

async fn build_store(settings: &Settings) -> Result<Arc<dyn VectorStore>> {
    match settings.store.backend {
        StoreBackend::Postgres => {
            let store =
                PgVectorStore::connect(&settings.store.database_url, settings.store.schema.as_str())
                    .await
                    .context("Failed to connect to Postgres")?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            info!("Using in-memory store; nothing is persisted");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

fn build_embedder(settings: &Settings) -> Result<Arc<dyn EmbeddingProvider>> {
    let config = ApiEmbedderConfig::from_settings(&settings.embedding);
    let embedder = ApiEmbedder::new(config).context("Failed to create embedding client")?;
    Ok(Arc::new(embedder))
}

/// Read the batch JSON from a file, or stdin for `-`.
async fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        read_stream(tokio::io::stdin())
            .await
            .context("Failed to read batch from stdin")
    } else {
        tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read batch file {input}"))
    }
}

async fn read_stream<R: AsyncRead + Unpin>(mut reader: R) -> std::io::Result<String> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf).await?;
    Ok(buf)
}

fn print_response(response: &BatchResponse) -> Result<()> {
    let json = serde_json::to_string_pretty(response).context("Failed to encode response")?;
    println!("{json}");
    Ok(())
}

/// Run one batch and print its response.
///
/// Returns whether the batch succeeded. Malformed or invalid batches and
/// pipeline failures all print the generic error response.
pub async fn run_batch(
    config_path: Option<&str>,
    overrides: &CliOverrides,
    input: &str,
) -> Result<bool> {
    let settings = load_settings(config_path, overrides)?;
    init_logging(&settings.log_level)?;

    let raw = read_input(input).await?;
    let request: BatchRequest = match serde_json::from_str(&raw) {
        Ok(request) => request,
        Err(e) => {
            error!(error = %e, "Malformed batch request");
            print_response(&BatchResponse::failed())?;
            return Ok(false);
        }
    };

    let store = build_store(&settings).await?;
    let embedder = build_embedder(&settings)?;
    info!(
        model = embedder.model(),
        backend = ?settings.store.backend,
        messages = request.messages.len(),
        "Dedup daemon ready"
    );

    let dedup = BatchDeduplicator::new(embedder, store)
        .with_chunk_size(settings.embedding.chunk_size);
    let response = dedup.respond(&request).await;
    print_response(&response)?;
    Ok(response.is_success())
}

/// Create the pgvector table `table` with `dimension`-wide embeddings.
pub async fn prepare_table(
    config_path: Option<&str>,
    overrides: &CliOverrides,
    table: &str,
    dimension: usize,
) -> Result<()> {
    let settings = load_settings(config_path, overrides)?;
    init_logging(&settings.log_level)?;

    let store = PgVectorStore::connect(&settings.store.database_url, settings.store.schema.as_str())
        .await
        .context("Failed to connect to Postgres")?;
    store
        .prepare_table(table, dimension)
        .await
        .with_context(|| format!("Failed to prepare table {table}"))?;
    println!("Table {table} ready ({dimension} dimensions)");
    Ok(())
}

/// Print the resolved settings as TOML, API key masked.
pub fn show_config(config_path: Option<&str>) -> Result<()> {
    let settings = load_settings(config_path, &CliOverrides::default())?;
    let rendered =
        toml::to_string_pretty(&settings.redacted()).context("Failed to render settings")?;
    print!("{rendered}");
    Ok(())
}
