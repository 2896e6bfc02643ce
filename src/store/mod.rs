//! Chunk storage using SQLite
//!
//! This module owns the single shared mutable resource in the system:
//! the chunks table. All mutation goes through `replace_document` and
//! `purge_all`, each a single transaction, so readers only ever observe
//! a document's old chunk set or its new one — never a mixture.
//!
//! Nearest-neighbor search is an exact scan: embeddings are decoded from
//! their blobs and ranked by L2 distance in-process. Over unit-length
//! vectors this ranking is identical to cosine ranking.

mod schema;
mod vector;

pub use schema::*;
pub use vector::*;

use crate::config::Config;
use crate::error::{Error, Result};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::{debug, info};

/// A chunk to be inserted, before the store assigns its identity
#[derive(Debug, Clone)]
pub struct NewChunk {
    pub origin_filename: Option<String>,
    pub origin_uri: Option<String>,
    pub section_headers: Vec<String>,
    pub pages: Vec<i64>,
    pub serialized_text: String,
    pub embedding: Vec<f32>,
}

/// A stored chunk with its assigned identity
#[derive(Debug, Clone)]
pub struct Chunk {
    pub chunk_id: i64,
    pub doc_id: String,
    pub origin_filename: Option<String>,
    pub origin_uri: Option<String>,
    pub section_headers: Vec<String>,
    pub pages: Vec<i64>,
    pub serialized_text: String,
    pub embedding: Vec<f32>,
    pub created_at: String,
}

/// Raw chunk row as persisted
#[derive(Debug, Clone, FromRow)]
struct ChunkRow {
    chunk_id: i64,
    doc_id: String,
    origin_filename: Option<String>,
    origin_uri: Option<String>,
    section_headers_json: String,
    pages_json: String,
    serialized_text: String,
    embedding: Vec<u8>,
    created_at: String,
}

impl ChunkRow {
    fn into_chunk(self, dimension: usize) -> Result<Chunk> {
        let embedding = decode_embedding(&self.embedding, dimension)?;
        Ok(Chunk {
            chunk_id: self.chunk_id,
            doc_id: self.doc_id,
            origin_filename: self.origin_filename,
            origin_uri: self.origin_uri,
            section_headers: serde_json::from_str(&self.section_headers_json)?,
            pages: serde_json::from_str(&self.pages_json)?,
            serialized_text: self.serialized_text,
            embedding,
            created_at: self.created_at,
        })
    }
}

/// Per-document statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct DocumentStats {
    pub doc_id: String,
    pub chunk_count: usize,
}

/// Chunk store handle
#[derive(Clone)]
pub struct ChunkStore {
    pool: SqlitePool,
    dimension: usize,
}

impl ChunkStore {
    /// Connect to the chunk store using config
    pub async fn connect(config: &Config) -> Result<Self> {
        Self::new(
            &config.paths.db_file,
            config.embedding.resolved_dimension(),
        )
        .await
    }

    /// Open (or create) the store at the given path with a fixed dimension
    pub async fn new(db_path: &std::path::Path, dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::Config(
                "Embedding dimension must be positive".to_string(),
            ));
        }

        // Create parent directory if needed
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        debug!("Connecting to SQLite database at {:?}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::query(SCHEMA_SQL).execute(&pool).await?;

        Ok(Self { pool, dimension })
    }

    /// Get the expected embedding dimension for this store
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Atomically replace every chunk of a document
    ///
    /// Deletes all chunks with this doc_id, then inserts the given chunks
    /// in order, as one transaction. An empty chunk list is a pure delete.
    /// Any embedding with the wrong dimension fails the whole call before
    /// anything is written.
    pub async fn replace_document(&self, doc_id: &str, chunks: &[NewChunk]) -> Result<usize> {
        if let Some(mismatch) = chunks.iter().find(|c| c.embedding.len() != self.dimension) {
            return Err(Error::Storage(format!(
                "Embedding dimension mismatch for doc '{}': expected {}, got {}",
                doc_id,
                self.dimension,
                mismatch.embedding.len()
            )));
        }

        debug!(
            "Replacing document '{}' with {} chunks",
            doc_id,
            chunks.len()
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM chunks WHERE doc_id = ?")
            .bind(doc_id)
            .execute(&mut *tx)
            .await?;

        let created_at = Utc::now().to_rfc3339();
        for chunk in chunks {
            sqlx::query(
                r#"
                INSERT INTO chunks (doc_id, origin_filename, origin_uri, section_headers_json, pages_json, serialized_text, embedding, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(doc_id)
            .bind(&chunk.origin_filename)
            .bind(&chunk.origin_uri)
            .bind(serde_json::to_string(&chunk.section_headers)?)
            .bind(serde_json::to_string(&chunk.pages)?)
            .bind(&chunk.serialized_text)
            .bind(encode_embedding(&chunk.embedding))
            .bind(&created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!("Stored {} chunks for document '{}'", chunks.len(), doc_id);
        Ok(chunks.len())
    }

    /// Return up to k chunks ordered by ascending L2 distance to the query
    ///
    /// Ties break by insertion order (chunk_id). An empty store yields an
    /// empty result, not an error.
    pub async fn nearest_neighbors(
        &self,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<(Chunk, f32)>> {
        if k == 0 {
            return Err(Error::Validation(
                "Nearest-neighbor count k must be positive".to_string(),
            ));
        }

        if query_vector.len() != self.dimension {
            return Err(Error::Storage(format!(
                "Query vector dimension mismatch: expected {}, got {}",
                self.dimension,
                query_vector.len()
            )));
        }

        let rows = sqlx::query_as::<_, ChunkRow>("SELECT * FROM chunks ORDER BY chunk_id")
            .fetch_all(&self.pool)
            .await?;

        let mut scored: Vec<(Chunk, f32)> = Vec::with_capacity(rows.len());
        for row in rows {
            let chunk = row.into_chunk(self.dimension)?;
            let distance = l2_distance(query_vector, &chunk.embedding);
            scored.push((chunk, distance));
        }

        // Stable sort preserves chunk_id order among equal distances
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        debug!("Nearest-neighbor scan returned {} chunks", scored.len());
        Ok(scored)
    }

    /// Delete every chunk; idempotent
    pub async fn purge_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM chunks").execute(&self.pool).await?;
        let deleted = result.rows_affected();
        info!("Purged {} chunks", deleted);
        Ok(deleted)
    }

    /// Total number of stored chunks
    pub async fn count_chunks(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    /// Number of distinct documents
    pub async fn count_documents(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT doc_id) FROM chunks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    /// Per-document chunk counts
    pub async fn list_documents(&self) -> Result<Vec<DocumentStats>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT doc_id, COUNT(*) FROM chunks GROUP BY doc_id ORDER BY doc_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(doc_id, count)| DocumentStats {
                doc_id,
                chunk_count: count as usize,
            })
            .collect())
    }

    /// All chunks of one document in insertion order
    pub async fn get_document_chunks(&self, doc_id: &str) -> Result<Vec<Chunk>> {
        let rows = sqlx::query_as::<_, ChunkRow>(
            "SELECT * FROM chunks WHERE doc_id = ? ORDER BY chunk_id",
        )
        .bind(doc_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.into_chunk(self.dimension))
            .collect()
    }
}
