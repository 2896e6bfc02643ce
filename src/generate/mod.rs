//! Grounded answer generation
//!
//! This module provides an abstraction over text generation providers with:
//! - A trait for different generation backends
//! - An OpenAI-compatible chat completions backend
//! - The structured output contract the answer pipeline enforces
//!
//! When a schema is supplied, the returned text must parse into that
//! structure; anything else is a contract violation, never coerced.

mod http_backend;

pub use http_backend::*;

use crate::config::GenerationConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Structural description of the expected generator output
#[derive(Debug, Clone)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

/// Trait for answer generation providers
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate text from a system instruction and a user prompt,
    /// optionally constrained to a structured output schema
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: Option<&ResponseSchema>,
    ) -> Result<String>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Create a generator based on configuration
pub fn create_generator(config: &GenerationConfig) -> Result<Box<dyn Generator>> {
    let generator = HttpGenerator::new(config)?;
    Ok(Box::new(generator))
}

/// The two-field structured answer the generator must produce
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroundedAnswer {
    pub answer_text: String,
    pub answer_sources: Vec<String>,
}

impl GroundedAnswer {
    /// Schema constraint handed to the generator
    pub fn response_schema() -> ResponseSchema {
        ResponseSchema {
            name: "grounded_answer".to_string(),
            schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "answer_text": { "type": "string" },
                    "answer_sources": {
                        "type": "array",
                        "items": { "type": "string" }
                    }
                },
                "required": ["answer_text", "answer_sources"],
                "additionalProperties": false
            }),
        }
    }

    /// Parse raw generator output, surfacing any mismatch as a contract
    /// violation rather than defaulting to a fabricated answer
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| {
            Error::GenerationContract(format!("Generator output failed schema: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_output() {
        let raw = r#"{"answer_text": "42", "answer_sources": ["the answer is 42"]}"#;
        let answer = GroundedAnswer::parse(raw).unwrap();
        assert_eq!(answer.answer_text, "42");
        assert_eq!(answer.answer_sources.len(), 1);
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let err = GroundedAnswer::parse("I think the answer is 42").unwrap_err();
        assert!(matches!(err, Error::GenerationContract(_)));
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        let err = GroundedAnswer::parse(r#"{"answer_text": "42"}"#).unwrap_err();
        assert!(matches!(err, Error::GenerationContract(_)));
    }

    #[test]
    fn test_parse_rejects_unknown_field() {
        let raw = r#"{"answer_text": "42", "answer_sources": [], "confidence": 0.9}"#;
        let err = GroundedAnswer::parse(raw).unwrap_err();
        assert!(matches!(err, Error::GenerationContract(_)));
    }

    #[test]
    fn test_response_schema_shape() {
        let schema = GroundedAnswer::response_schema();
        assert_eq!(schema.name, "grounded_answer");
        assert_eq!(
            schema.schema["required"],
            serde_json::json!(["answer_text", "answer_sources"])
        );
    }
}
