//! Ollama HTTP client (`/api/chat`, `/api/tags`).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use leadforge_shared::{LeadForgeError, LlmConfig, Result};

use crate::{ChatMessage, ChatModel, ChatRequest, ResponseFormat};

/// Timeout for the reachability probe.
const HEALTH_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: String,
}

/// Client for a local (or remote) Ollama server.
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Build a client from the `[llm]` config section.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LeadForgeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    #[instrument(skip_all, fields(model = %self.model, messages = request.messages.len()))]
    async fn chat(&self, request: ChatRequest) -> Result<String> {
        let start = Instant::now();
        let body = ChatBody {
            model: &self.model,
            messages: &request.messages,
            stream: false,
            format: match request.format {
                ResponseFormat::Json => Some("json"),
                ResponseFormat::Text => None,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "model request failed");
                LeadForgeError::Model(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(%status, error = %error_text, "model API error");
            return Err(LeadForgeError::Model(format!("HTTP {status}: {error_text}")));
        }

        let reply: ChatReply = response
            .json()
            .await
            .map_err(|e| LeadForgeError::Model(format!("unreadable chat reply: {e}")))?;

        debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            chars = reply.message.content.len(),
            "chat completion"
        );

        Ok(reply.message.content)
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(Duration::from_secs(HEALTH_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| {
                LeadForgeError::Model(format!("could not connect to {}: {e}", self.base_url))
            })?;

        if !response.status().is_success() {
            return Err(LeadForgeError::Model(format!(
                "{} answered HTTP {}",
                self.base_url,
                response.status()
            )));
        }
        Ok(())
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OllamaClient {
        let config = LlmConfig {
            base_url: server.uri(),
            ..LlmConfig::default()
        };
        OllamaClient::new(&config).expect("build client")
    }

    fn reply(content: &str) -> serde_json::Value {
        serde_json::json!({
            "model": "llama3:8b",
            "created_at": "2024-05-01T12:00:00Z",
            "message": { "role": "assistant", "content": content },
            "done": true
        })
    }

    #[tokio::test]
    async fn text_chat_omits_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3:8b",
                "stream": false,
                "messages": [{ "role": "user", "content": "services?" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("AI Audits, MLOps")))
            .expect(1)
            .mount(&server)
            .await;

        let out = client_for(&server)
            .chat(ChatRequest::new().message(ChatMessage::user("services?")))
            .await
            .expect("chat");
        assert_eq!(out, "AI Audits, MLOps");

        let received = server.received_requests().await.expect("recording enabled");
        let body: serde_json::Value = received[0].body_json().expect("json body");
        assert!(body.get("format").is_none());
    }

    #[tokio::test]
    async fn json_chat_sets_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({ "format": "json" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(reply(r#"{"summary":"s","industry":"i"}"#)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let out = client_for(&server)
            .chat(ChatRequest::new().message(ChatMessage::user("x")).json())
            .await
            .expect("chat");
        assert!(out.starts_with('{'));
    }

    #[tokio::test]
    async fn server_error_is_model_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model 'llama3:8b' not found"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .chat(ChatRequest::new().message(ChatMessage::user("x")))
            .await
            .unwrap_err();
        assert!(matches!(err, LeadForgeError::Model(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn health_check_hits_tags() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"models": []})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).health_check().await.expect("healthy");
    }

    #[tokio::test]
    async fn health_check_unreachable() {
        let config = LlmConfig {
            base_url: "http://127.0.0.1:9".into(),
            ..LlmConfig::default()
        };
        let err = OllamaClient::new(&config)
            .expect("build client")
            .health_check()
            .await
            .unwrap_err();
        assert!(err.hint().unwrap().contains("ollama serve"));
    }
}
