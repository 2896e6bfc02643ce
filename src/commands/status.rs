//! Status command implementation

use crate::config::Config;
use crate::error::Result;
use crate::store::{ChunkStore, DocumentStats};
use serde::Serialize;

/// Snapshot of system state
#[derive(Debug, Clone, Serialize)]
pub struct StatusResult {
    pub db_file: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub generation_model: String,
    pub document_count: usize,
    pub chunk_count: usize,
    pub documents: Vec<DocumentStats>,
}

/// Gather corpus and configuration status
pub async fn cmd_status(config: &Config, store: &ChunkStore) -> Result<StatusResult> {
    Ok(StatusResult {
        db_file: config.paths.db_file.display().to_string(),
        embedding_model: config.embedding.model.clone(),
        embedding_dimension: store.dimension(),
        generation_model: config.generation.model.clone(),
        document_count: store.count_documents().await?,
        chunk_count: store.count_chunks().await?,
        documents: store.list_documents().await?,
    })
}

/// Print status to console
pub fn print_status(status: &StatusResult) {
    println!("docqa status");
    println!("  Database: {}", status.db_file);
    println!(
        "  Embedding: {} (dimension {})",
        status.embedding_model, status.embedding_dimension
    );
    println!("  Generation: {}", status.generation_model);
    println!(
        "  Corpus: {} documents, {} chunks",
        status.document_count, status.chunk_count
    );

    for doc in &status.documents {
        println!("    {} ({} chunks)", doc.doc_id, doc.chunk_count);
    }
}
