//! Retrieval and answer pipeline: query -> nearest chunks -> grounded answer

use crate::embed::Embedder;
use crate::error::{Error, Result};
use crate::generate::{Generator, GroundedAnswer};
use crate::pipeline::prompts::{
    question_answering_user_prompt, CONTEXT_DELIMITER, QUESTION_ANSWERING_SYSTEM_PROMPT,
    UNANSWERABLE,
};
use crate::store::{similarity_from_distance, Chunk, ChunkStore};
use serde::Serialize;
use tracing::{debug, info, warn};

/// A grounded answer with its supporting quotes
#[derive(Debug, Clone, Serialize)]
pub struct AnswerResult {
    pub answer_text: String,
    pub answer_sources: Vec<String>,
    pub retrieved_count: usize,
}

impl AnswerResult {
    fn unanswerable(retrieved_count: usize) -> Self {
        Self {
            answer_text: UNANSWERABLE.to_string(),
            answer_sources: Vec::new(),
            retrieved_count,
        }
    }
}

/// Retrieval and answer pipeline over injected collaborators
pub struct AnswerPipeline<'a> {
    store: &'a ChunkStore,
    embedder: &'a dyn Embedder,
    generator: &'a dyn Generator,
    verify_sources: bool,
}

impl<'a> AnswerPipeline<'a> {
    pub fn new(
        store: &'a ChunkStore,
        embedder: &'a dyn Embedder,
        generator: &'a dyn Generator,
        verify_sources: bool,
    ) -> Self {
        Self {
            store,
            embedder,
            generator,
            verify_sources,
        }
    }

    /// Answer a question from the k nearest chunks
    ///
    /// An empty retrieval is not an error: it short-circuits to the
    /// UNANSWERABLE sentinel without spending a generation call.
    pub async fn answer(&self, query: &str, top_k: usize) -> Result<AnswerResult> {
        if top_k == 0 {
            return Err(Error::Validation("top_k must be positive".to_string()));
        }

        info!("Answering query: {}", query);

        let query_vector = self.embedder.embed(query).await?;
        let retrieved = self.store.nearest_neighbors(&query_vector, top_k).await?;

        if retrieved.is_empty() {
            debug!("No context retrieved; returning sentinel without generation");
            return Ok(AnswerResult::unanswerable(0));
        }

        let retrieved_count = retrieved.len();
        if let Some((best, distance)) = retrieved.first() {
            debug!(
                "Retrieved {} chunks; best match chunk {} (similarity {:.3})",
                retrieved_count,
                best.chunk_id,
                similarity_from_distance(*distance)
            );
        }

        let context = assemble_context(&retrieved);
        let schema = GroundedAnswer::response_schema();
        let raw = self
            .generator
            .generate(
                QUESTION_ANSWERING_SYSTEM_PROMPT,
                &question_answering_user_prompt(query, &context),
                Some(&schema),
            )
            .await?;

        let parsed = GroundedAnswer::parse(&raw)?;

        if self.verify_sources && parsed.answer_text != UNANSWERABLE {
            if let Some(bad) = parsed
                .answer_sources
                .iter()
                .find(|source| !context.contains(source.as_str()))
            {
                warn!(
                    "Generator source is not a verbatim quote, downgrading: {}",
                    bad
                );
                return Ok(AnswerResult::unanswerable(retrieved_count));
            }
        }

        Ok(AnswerResult {
            answer_text: parsed.answer_text,
            answer_sources: parsed.answer_sources,
            retrieved_count,
        })
    }
}

/// Concatenate retrieved chunks into one labeled context block,
/// in ascending-distance order
fn assemble_context(retrieved: &[(Chunk, f32)]) -> String {
    retrieved
        .iter()
        .map(|(chunk, _distance)| {
            format!(
                "DocID: {}, ChunkID: {}, Headers: {:?}, Pages: {:?}\n{}",
                chunk.doc_id,
                chunk.chunk_id,
                chunk.section_headers,
                chunk.pages,
                chunk.serialized_text
            )
        })
        .collect::<Vec<_>>()
        .join(CONTEXT_DELIMITER)
}
