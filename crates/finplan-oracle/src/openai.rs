//! OpenAI chat-completions oracle.
//!
//! Works against api.openai.com and any server that mirrors its
//! `/v1/chat/completions` contract (Ollama, vLLM, LM Studio, ...).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::{Oracle, OracleConfig, OracleError, OracleRequest, OracleType};

/// Oracle backed by an OpenAI-compatible HTTP API
pub struct OpenAiOracle {
    config: OracleConfig,
    http: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiOracle {
    pub fn new(config: OracleConfig) -> Result<Self, OracleError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.config.base_url)
    }

    fn build_body<'a>(&'a self, request: &'a OracleRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
        }
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    fn name(&self) -> &str {
        "OpenAI"
    }

    fn oracle_type(&self) -> OracleType {
        OracleType::OpenAi
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: &OracleRequest) -> Result<String, OracleError> {
        let start = Instant::now();
        debug!(
            model = %self.config.model,
            system_len = request.system.len(),
            prompt_len = request.prompt.len(),
            "Sending completion request"
        );

        let mut http_request = self.http.post(self.endpoint()).json(&self.build_body(request));
        if let Some(ref key) = self.config.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let response = http_request.send().await.map_err(|e| match self.config.timeout {
            Some(timeout) if e.is_timeout() => OracleError::Timeout(timeout),
            _ => OracleError::Network(e),
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Oracle returned an error status");
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::InvalidResponse(e.to_string()))?;

        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(OracleError::EmptyResponse)?;

        debug!(
            text_len = text.len(),
            duration_ms = start.elapsed().as_millis(),
            "Completion received"
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn oracle_for(server: &MockServer) -> OpenAiOracle {
        let config = OracleConfig::new("gpt-4o-mini")
            .with_base_url(server.uri())
            .with_api_key(Some("test-key".to_string()));
        OpenAiOracle::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "30, $75000"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "| a | b |\n|---|---|"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let oracle = oracle_for(&server);
        let text = oracle
            .complete(&OracleRequest::new("be brief", "30, $75000"))
            .await
            .unwrap();

        assert_eq!(text, "| a | b |\n|---|---|");
    }

    #[tokio::test]
    async fn test_error_status_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .expect(1)
            .mount(&server)
            .await;

        let oracle = oracle_for(&server);
        let err = oracle
            .complete(&OracleRequest::new("sys", "prompt"))
            .await
            .unwrap_err();

        match err {
            OracleError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_content_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let oracle = oracle_for(&server);
        let err = oracle
            .complete(&OracleRequest::new("sys", "prompt"))
            .await
            .unwrap_err();

        assert!(matches!(err, OracleError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_slow_server_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(serde_json::json!({
                        "choices": [{"message": {"content": "late"}}]
                    })),
            )
            .mount(&server)
            .await;

        let config = OracleConfig::new("gpt-4o-mini")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(50));
        let oracle = OpenAiOracle::new(config).unwrap();

        let err = oracle
            .complete(&OracleRequest::new("sys", "prompt"))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
    }
}
