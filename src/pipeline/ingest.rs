//! Ingestion pipeline: parsed fragments -> embeddings -> atomic store write

use crate::embed::Embedder;
use crate::error::{Error, Result};
use crate::parse::ParsedFragment;
use crate::store::{ChunkStore, NewChunk};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use tracing::{debug, info};

/// Outcome of ingesting one document
#[derive(Debug, Clone, Serialize)]
pub struct IngestResult {
    pub doc_id: String,
    pub chunks_inserted: usize,
}

/// Ingestion pipeline over injected collaborators
pub struct IngestPipeline<'a> {
    store: &'a ChunkStore,
    embedder: &'a dyn Embedder,
    concurrency: usize,
}

impl<'a> IngestPipeline<'a> {
    pub fn new(store: &'a ChunkStore, embedder: &'a dyn Embedder, concurrency: usize) -> Self {
        Self {
            store,
            embedder,
            concurrency: concurrency.max(1),
        }
    }

    /// Embed every fragment and atomically replace the document's chunks
    ///
    /// Embedding requests run concurrently up to the configured bound, but
    /// the buffered stream yields results in input order, so stored chunk
    /// order always matches fragment order. Any embedding or storage
    /// failure aborts the whole ingestion with no document state change.
    pub async fn ingest(
        &self,
        doc_id: &str,
        fragments: &[ParsedFragment],
    ) -> Result<IngestResult> {
        if fragments.is_empty() {
            return Err(Error::Validation(format!(
                "Document '{}' produced no fragments",
                doc_id
            )));
        }

        let texts: Vec<String> = fragments.iter().map(|f| f.serialized_text()).collect();

        debug!(
            "Embedding {} fragments for document '{}' (concurrency {})",
            texts.len(),
            doc_id,
            self.concurrency
        );

        let embeddings: Vec<Vec<f32>> = stream::iter(texts.iter())
            .map(|text| self.embedder.embed(text))
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let chunks: Vec<NewChunk> = fragments
            .iter()
            .zip(texts.into_iter().zip(embeddings))
            .map(|(fragment, (serialized_text, embedding))| NewChunk {
                origin_filename: fragment.origin_filename.clone(),
                origin_uri: fragment.origin_uri.clone(),
                section_headers: fragment.section_headers.clone(),
                pages: fragment.page_set(),
                serialized_text,
                embedding,
            })
            .collect();

        let inserted = self.store.replace_document(doc_id, &chunks).await?;

        info!("Ingested document '{}': {} chunks", doc_id, inserted);

        Ok(IngestResult {
            doc_id: doc_id.to_string(),
            chunks_inserted: inserted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::FragmentItem;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Embedder stub that finishes later fragments first, to prove that
    /// completion order cannot leak into stored chunk order
    struct ReorderingEmbedder {
        calls: AtomicUsize,
        fail_on: Option<String>,
    }

    impl ReorderingEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: None,
            }
        }

        fn failing_on(text: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: Some(text.to_string()),
            }
        }
    }

    #[async_trait]
    impl Embedder for ReorderingEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self.fail_on.as_deref() == Some(text) {
                return Err(Error::Embedding("provider unavailable".to_string()));
            }

            // Earlier fragments take longer than later ones
            let (delay_ms, vector) = match text {
                "f1" => (30, vec![1.0, 0.0, 0.0]),
                "f2" => (15, vec![0.0, 1.0, 0.0]),
                _ => (0, vec![0.0, 0.0, 1.0]),
            };
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Ok(vector)
        }

        fn dimension(&self) -> usize {
            3
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    async fn setup_store() -> (ChunkStore, TempDir) {
        let tmp = TempDir::new().unwrap();
        let store = ChunkStore::new(&tmp.path().join("test.db"), 3)
            .await
            .unwrap();
        (store, tmp)
    }

    fn fragment(text: &str, page: i64) -> ParsedFragment {
        ParsedFragment {
            items: vec![FragmentItem {
                text: text.to_string(),
                pages: vec![page],
            }],
            section_headers: vec![],
            origin_filename: Some("test.pdf".to_string()),
            origin_uri: None,
        }
    }

    #[tokio::test]
    async fn test_ingest_preserves_fragment_order() {
        let (store, _tmp) = setup_store().await;
        let embedder = ReorderingEmbedder::new();
        let pipeline = IngestPipeline::new(&store, &embedder, 4);

        let fragments = vec![fragment("f1", 1), fragment("f2", 2), fragment("f3", 3)];
        let result = pipeline.ingest("doc-1", &fragments).await.unwrap();
        assert_eq!(result.chunks_inserted, 3);

        let stored = store.get_document_chunks("doc-1").await.unwrap();
        let texts: Vec<&str> = stored.iter().map(|c| c.serialized_text.as_str()).collect();
        assert_eq!(texts, vec!["f1", "f2", "f3"]);

        // Each chunk kept the embedding of its own fragment
        assert_eq!(stored[0].embedding, vec![1.0, 0.0, 0.0]);
        assert_eq!(stored[1].embedding, vec![0.0, 1.0, 0.0]);
        assert_eq!(stored[2].embedding, vec![0.0, 0.0, 1.0]);
    }

    #[tokio::test]
    async fn test_ingest_rejects_empty_fragment_set() {
        let (store, _tmp) = setup_store().await;
        let embedder = ReorderingEmbedder::new();
        let pipeline = IngestPipeline::new(&store, &embedder, 4);

        let err = pipeline.ingest("doc-1", &[]).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.count_chunks().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_leaves_document_untouched() {
        let (store, _tmp) = setup_store().await;

        // Seed an existing version of the document
        let seeder = ReorderingEmbedder::new();
        IngestPipeline::new(&store, &seeder, 4)
            .ingest("doc-1", &[fragment("f1", 1)])
            .await
            .unwrap();

        let embedder = ReorderingEmbedder::failing_on("f2");
        let pipeline = IngestPipeline::new(&store, &embedder, 4);
        let fragments = vec![fragment("f1", 1), fragment("f2", 2), fragment("f3", 3)];

        let err = pipeline.ingest("doc-1", &fragments).await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));

        // Old chunk set still intact
        let stored = store.get_document_chunks("doc-1").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].serialized_text, "f1");
    }

    #[tokio::test]
    async fn test_ingest_carries_fragment_metadata() {
        let (store, _tmp) = setup_store().await;
        let embedder = ReorderingEmbedder::new();
        let pipeline = IngestPipeline::new(&store, &embedder, 4);

        let f = ParsedFragment {
            items: vec![
                FragmentItem {
                    text: "f3".to_string(),
                    pages: vec![5, 2],
                },
                FragmentItem {
                    text: "more".to_string(),
                    pages: vec![2],
                },
            ],
            section_headers: vec!["Results".to_string()],
            origin_filename: Some("report.pdf".to_string()),
            origin_uri: Some("file:///report.pdf".to_string()),
        };

        pipeline.ingest("doc-1", &[f]).await.unwrap();

        let stored = store.get_document_chunks("doc-1").await.unwrap();
        assert_eq!(stored[0].serialized_text, "f3\n\nmore");
        assert_eq!(stored[0].pages, vec![2, 5]);
        assert_eq!(stored[0].section_headers, vec!["Results".to_string()]);
        assert_eq!(stored[0].origin_uri.as_deref(), Some("file:///report.pdf"));
    }
}
