//! Query command implementation

use crate::config::Config;
use crate::embed::create_embedder;
use crate::error::Result;
use crate::generate::create_generator;
use crate::pipeline::prompts::UNANSWERABLE;
use crate::pipeline::{AnswerPipeline, AnswerResult};
use crate::store::ChunkStore;

/// Answer a question from the ingested corpus
pub async fn cmd_query(
    config: &Config,
    store: &ChunkStore,
    question: &str,
    top_k: Option<usize>,
) -> Result<AnswerResult> {
    let top_k = top_k.unwrap_or(config.query.default_top_k);

    let embedder = create_embedder(&config.embedding)?;
    let generator = create_generator(&config.generation)?;

    let pipeline = AnswerPipeline::new(
        store,
        embedder.as_ref(),
        generator.as_ref(),
        config.query.verify_sources,
    );
    pipeline.answer(question, top_k).await
}

/// Print a grounded answer to console
pub fn print_answer(question: &str, result: &AnswerResult) {
    println!("\n🔍 Question: {}\n", question);

    if result.answer_text == UNANSWERABLE {
        println!("No answer could be grounded in the ingested documents.");
        println!("  (chunks retrieved: {})", result.retrieved_count);
        return;
    }

    println!("{}\n", result.answer_text);
    println!(
        "Sources ({} chunks retrieved):",
        result.retrieved_count
    );
    for (i, source) in result.answer_sources.iter().enumerate() {
        println!("  {}. \"{}\"", i + 1, source);
    }
}
