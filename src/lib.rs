//! # docqa — grounded question answering over ingested PDF corpora
//!
//! docqa stores embedded document fragments ("chunks") in SQLite,
//! retrieves the nearest ones for a query, and asks a language model for
//! an answer that must be justified by verbatim quotes from that context.
//!
//! ## Architecture
//!
//! - **[`config`]** — TOML configuration, defaults, and validation
//! - **[`store`]** — SQLite chunk store: atomic replace-by-document,
//!   exact L2 nearest-neighbor scan, purge
//! - **[`embed`]** — `Embedder` trait + OpenAI-compatible HTTP backend
//! - **[`generate`]** — `Generator` trait + chat-completions backend with
//!   the structured output contract
//! - **[`parse`]** — fragment model and the PDF document parser
//! - **[`pipeline`]** — ingestion and retrieval/answer orchestration
//! - **[`commands`]** — CLI command implementations

pub mod commands;
pub mod config;
pub mod embed;
pub mod error;
pub mod generate;
pub mod parse;
pub mod pipeline;
pub mod store;
