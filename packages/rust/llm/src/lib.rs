//! Language-model collaborator for LeadForge.
//!
//! Every model call in the pipeline is a single chat round trip: an optional
//! system message, one user message, and optionally a request for a JSON
//! object instead of free text. [`ChatModel`] is the seam; [`OllamaClient`]
//! talks to a local Ollama server.

mod ollama;
mod structured;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use leadforge_shared::Result;

pub use ollama::OllamaClient;
pub use structured::parse_structured;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Shape of the completion the caller expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Free text.
    #[default]
    Text,
    /// A single JSON object (the server constrains decoding).
    Json,
}

/// One chat call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub format: ResponseFormat,
}

impl ChatRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    pub fn message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Ask for a JSON object reply.
    pub fn json(mut self) -> Self {
        self.format = ResponseFormat::Json;
        self
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A chat-capable language model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one request and return the completion text.
    async fn chat(&self, request: ChatRequest) -> Result<String>;

    /// Verify the model service is reachable.
    async fn health_check(&self) -> Result<()>;

    /// Model identifier, for logs.
    fn model_id(&self) -> &str;
}
