use super::{Generator, ResponseSchema};
use crate::config::GenerationConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Generator backed by an OpenAI-compatible chat completions API
pub struct HttpGenerator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    retries: usize,
}

impl HttpGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let endpoint = format!(
            "{}/v1/chat/completions",
            config.api_base.trim_end_matches('/')
        );

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key(),
            model: config.model.clone(),
            retries: 2,
        })
    }

    async fn send_with_retry(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let mut last_err: Option<Error> = None;
        for attempt in 0..=self.retries {
            let mut req = self.client.post(&self.endpoint).json(request);
            if let Some(key) = &self.api_key {
                req = req.bearer_auth(key);
            }

            match req.send().await {
                Ok(response) => match response.error_for_status() {
                    Ok(ok) => return Ok(ok.json::<ChatResponse>().await?),
                    Err(e) => last_err = Some(Error::Generation(e.to_string())),
                },
                Err(e) => last_err = Some(Error::Generation(e.to_string())),
            }

            if attempt < self.retries {
                tokio::time::sleep(Duration::from_millis(200 * (attempt + 1) as u64)).await;
            }
        }

        Err(last_err
            .unwrap_or_else(|| Error::Generation("Generation request failed".to_string())))
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: Option<&ResponseSchema>,
    ) -> Result<String> {
        let response_format = schema.map(|s| {
            json!({
                "type": "json_schema",
                "json_schema": {
                    "name": s.name,
                    "schema": s.schema,
                    "strict": true
                }
            })
        });

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            temperature: 0.0,
            response_format,
        };

        let response = self.send_with_retry(&request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Generation("No completion returned".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(api_base: &str) -> GenerationConfig {
        GenerationConfig {
            model: "test-model".to_string(),
            api_base: api_base.to_string(),
            api_key_env: "DOCQA_TEST_UNSET_KEY".to_string(),
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_generate_returns_completion_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "temperature": 0.0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "{\"answer_text\": \"yes\"}"}}]
            })))
            .mount(&server)
            .await;

        let generator = HttpGenerator::new(&test_config(&server.uri())).unwrap();
        let raw = generator.generate("system", "user", None).await.unwrap();
        assert_eq!(raw, "{\"answer_text\": \"yes\"}");
    }

    #[tokio::test]
    async fn test_generate_sends_schema_constraint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "response_format": {
                    "type": "json_schema",
                    "json_schema": { "name": "grounded_answer", "strict": true }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "{}"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let generator = HttpGenerator::new(&test_config(&server.uri())).unwrap();
        let schema = crate::generate::GroundedAnswer::response_schema();
        generator
            .generate("system", "user", Some(&schema))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_generate_surfaces_provider_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let generator = HttpGenerator::new(&test_config(&server.uri())).unwrap();
        let err = generator.generate("system", "user", None).await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }
}
