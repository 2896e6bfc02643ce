//! Default values for configuration

/// Default embedding model
pub fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

/// Default embedding API base URL
pub fn default_embedding_api_base() -> String {
    std::env::var("DOCQA_EMBEDDING_API_BASE")
        .unwrap_or_else(|_| "https://api.openai.com".to_string())
}

/// Default environment variable holding the embedding API key
pub fn default_embedding_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

/// Default embedding dimension (text-embedding-3-small)
pub fn default_embedding_dimension() -> usize {
    1536
}

/// Default number of concurrent embedding requests during ingestion
pub fn default_embedding_concurrency() -> usize {
    8
}

/// Default embedding request timeout in seconds
pub fn default_embedding_timeout() -> u64 {
    30
}

/// Default text generation model
pub fn default_generation_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Default generation API base URL
pub fn default_generation_api_base() -> String {
    std::env::var("DOCQA_GENERATION_API_BASE")
        .unwrap_or_else(|_| "https://api.openai.com".to_string())
}

/// Default environment variable holding the generation API key
pub fn default_generation_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

/// Default generation request timeout in seconds
pub fn default_generation_timeout() -> u64 {
    60
}

/// Default number of chunks retrieved per query
pub fn default_query_top_k() -> usize {
    10
}

/// Default: trust the generator's source quotes without re-checking
pub fn default_verify_sources() -> bool {
    false
}

/// Default maximum characters per parsed fragment
pub fn default_max_fragment_chars() -> usize {
    1500
}
