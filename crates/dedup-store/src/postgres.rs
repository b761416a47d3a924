//! Postgres + pgvector store.
//!
//! Vectors are bound as text and cast with `$n::text::vector`, so no
//! driver-side vector type is needed. Every statement runs in autocommit
//! mode: an insert is committed when `insert` returns.

use async_trait::async_trait;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, info};

use dedup_types::StoredRecord;

use crate::error::StoreError;
use crate::literal::vector_literal;
use crate::predicate::FilterPredicate;
use crate::store::{Neighbor, VectorStore};
use crate::table::TableName;

/// Columns written for every record, in bind order.
const INSERT_COLUMNS: &str = "message_id, \"timestamp\", content, platform_name, \
    platform_user_id, platform_message_id, platform_message_url, \
    job_id, topic, industry, subindustry, embedding, similarity_score";

/// pgvector-backed store.
pub struct PgVectorStore {
    client: Client,
    schema: String,
}

impl PgVectorStore {
    /// Connect and drive the connection on a background task.
    pub async fn connect(
        database_url: &str,
        schema: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "Postgres connection error");
            }
        });
        let store = Self::from_client(client, schema);
        info!(schema = %store.schema, "Connected to Postgres");
        Ok(store)
    }

    /// Wrap an already connected client.
    pub fn from_client(client: Client, schema: impl Into<String>) -> Self {
        Self {
            client,
            schema: schema.into(),
        }
    }

    fn table(&self, table: &str) -> Result<TableName, StoreError> {
        TableName::new(self.schema.as_str(), table)
    }

    /// Create the pgvector extension, the table and its cosine ANN index if missing.
    pub async fn prepare_table(&self, table: &str, dimension: usize) -> Result<(), StoreError> {
        if dimension == 0 {
            return Err(StoreError::InvalidDimension(dimension));
        }
        let table = self.table(table)?;
        self.client
            .batch_execute("CREATE EXTENSION IF NOT EXISTS vector")
            .await?;
        self.client
            .batch_execute(&create_table_sql(&table, dimension))
            .await?;
        self.client
            .batch_execute(&create_index_sql(&table))
            .await?;
        info!(table = %table.qualified(), dimension, "Prepared dedup table");
        Ok(())
    }
}

fn create_table_sql(table: &TableName, dimension: usize) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (
            id BIGSERIAL PRIMARY KEY,
            message_id TEXT NOT NULL,
            \"timestamp\" TIMESTAMPTZ NOT NULL,
            content TEXT NOT NULL,
            platform_name TEXT NOT NULL DEFAULT '',
            platform_user_id TEXT NOT NULL DEFAULT '',
            platform_message_id TEXT NOT NULL DEFAULT '',
            platform_message_url TEXT NOT NULL DEFAULT '',
            job_id TEXT NOT NULL,
            topic TEXT NOT NULL,
            industry TEXT NOT NULL,
            subindustry TEXT NOT NULL DEFAULT '',
            embedding VECTOR({dimension}) NOT NULL,
            similarity_score DOUBLE PRECISION NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
        table.qualified()
    )
}

fn create_index_sql(table: &TableName) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS {} ON {} USING hnsw (embedding vector_cosine_ops)",
        table.embedding_index_name(),
        table.qualified()
    )
}

/// Nearest-row query. `$1` is the vector literal, filter values follow.
fn nearest_sql(table: &TableName, predicate: &FilterPredicate) -> String {
    format!(
        "SELECT message_id, content, 1 - (embedding <=> $1::text::vector) AS similarity \
        FROM {} {} \
        ORDER BY embedding <=> $1::text::vector ASC \
        LIMIT 1",
        table.qualified(),
        predicate.where_clause(2)
    )
}

fn insert_sql(table: &TableName) -> String {
    format!(
        "INSERT INTO {} ({}) \
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12::text::vector, $13)",
        table.qualified(),
        INSERT_COLUMNS
    )
}

#[async_trait]
impl VectorStore for PgVectorStore {
    async fn nearest(
        &self,
        table: &str,
        predicate: &FilterPredicate,
        embedding: &[f32],
    ) -> Result<Option<Neighbor>, StoreError> {
        let table = self.table(table)?;
        let sql = nearest_sql(&table, predicate);
        let literal = vector_literal(embedding);

        let mut params: Vec<&(dyn ToSql + Sync)> =
            Vec::with_capacity(1 + predicate.conditions().len());
        params.push(&literal);
        for condition in predicate.conditions() {
            params.push(&condition.value);
        }

        let row = self.client.query_opt(&sql, &params).await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let similarity: f64 = row.try_get("similarity")?;
        Ok(Some(Neighbor {
            message_id: row.try_get("message_id")?,
            content: row.try_get("content")?,
            similarity: similarity as f32,
        }))
    }

    async fn insert(&self, table: &str, record: &StoredRecord) -> Result<(), StoreError> {
        let table = self.table(table)?;
        let literal = vector_literal(&record.embedding);
        let similarity = record.similarity_score as f64;

        self.client
            .execute(
                &insert_sql(&table),
                &[
                    &record.message_id,
                    &record.timestamp,
                    &record.content,
                    &record.platform_name,
                    &record.platform_user_id,
                    &record.platform_message_id,
                    &record.platform_message_url,
                    &record.job_id,
                    &record.topic,
                    &record.industry,
                    &record.subindustry,
                    &literal,
                    &similarity,
                ],
            )
            .await?;
        debug!(table = %table.qualified(), message_id = %record.message_id, "Inserted record");
        Ok(())
    }
}
