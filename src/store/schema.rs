//! SQLite schema definition

/// SQL schema for the chunk store
///
/// AUTOINCREMENT keeps deleted chunk_ids from ever being reassigned.
pub const SCHEMA_SQL: &str = r#"
-- Chunks: embedded document fragments with provenance
CREATE TABLE IF NOT EXISTS chunks (
    chunk_id INTEGER PRIMARY KEY AUTOINCREMENT,
    doc_id TEXT NOT NULL,
    origin_filename TEXT,
    origin_uri TEXT,
    section_headers_json TEXT NOT NULL,
    pages_json TEXT NOT NULL,
    serialized_text TEXT NOT NULL,
    embedding BLOB NOT NULL,
    created_at TEXT NOT NULL
);

-- Indexes for performance
CREATE INDEX IF NOT EXISTS idx_chunks_doc ON chunks(doc_id);
"#;
