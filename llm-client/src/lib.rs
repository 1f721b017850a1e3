//! # LLM client abstraction
//!
//! Defines the [`LlmClient`] trait and an Ollama implementation. Transport-agnostic;
//! used by llm-handlers. The trait returns an explicit [`LlmError`] so callers
//! decide how a backend failure surfaces (gbot maps it to an inline reply).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod ollama;

pub use ollama::{OllamaClient, OLLAMA_BASE_URL};

/// One message of a chat request, aligned with the backend wire format
/// `{ role, content, images? }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

/// Ways a model call can fail: transport, backend-reported, or malformed reply.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend error: {0}")]
    Api(String),
    #[error("malformed response: {0}")]
    InvalidResponse(String),
}

/// LLM client interface: one blocking completion from an ordered message list.
/// Single attempt, no retry, no timeout.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the model reply text for the given messages.
    async fn chat(&self, model: &str, messages: Vec<ChatMessage>) -> Result<String, LlmError>;
}
