//! Ingest command implementation

use crate::config::Config;
use crate::embed::create_embedder;
use crate::error::{Error, Result};
use crate::parse::{DocumentParser, PdfParser};
use crate::pipeline::{IngestPipeline, IngestResult};
use crate::store::ChunkStore;
use std::path::Path;
use tracing::info;

/// Ingest a PDF file, replacing any previous chunks of the same doc_id
pub async fn cmd_ingest(
    config: &Config,
    store: &ChunkStore,
    file: &Path,
    doc_id: Option<String>,
) -> Result<IngestResult> {
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| file.display().to_string());

    let doc_id = doc_id.unwrap_or_else(|| {
        file.file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| filename.clone())
    });

    info!("Ingesting '{}' as document '{}'", filename, doc_id);

    let raw_bytes = std::fs::read(file)?;
    if raw_bytes.is_empty() {
        return Err(Error::Validation(format!(
            "File is empty: {}",
            file.display()
        )));
    }

    let parser = PdfParser::new(&config.parser);
    let mut fragments = parser.parse(&filename, &raw_bytes)?;

    // Stamp provenance with the ingested file's URI
    let origin_uri = file
        .canonicalize()
        .map(|p| format!("file://{}", p.display()))
        .unwrap_or_else(|_| format!("file://{}", file.display()));
    for fragment in &mut fragments {
        fragment.origin_uri = Some(origin_uri.clone());
    }

    let embedder = create_embedder(&config.embedding)?;
    let pipeline = IngestPipeline::new(store, embedder.as_ref(), config.embedding.concurrency);
    pipeline.ingest(&doc_id, &fragments).await
}

/// Print ingestion outcome to console
pub fn print_ingest_result(result: &IngestResult) {
    println!("\n✓ Ingestion complete");
    println!("  Document: {}", result.doc_id);
    println!("  Chunks stored: {}", result.chunks_inserted);
}
