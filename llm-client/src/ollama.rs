//! Ollama implementation of [`LlmClient`]: non-streaming `/api/chat` calls
//! against a locally hosted server.

use crate::{ChatMessage, LlmClient, LlmError};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Default Ollama API base URL (local server).
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Reqwest-based client for the Ollama chat endpoint.
#[derive(Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OllamaClient {
    /// Creates a client against the default local server.
    pub fn new() -> Self {
        Self::with_base_url(OLLAMA_BASE_URL.to_string())
    }

    /// Creates a client against a custom base URL (e.g. a remote host or a
    /// mock server in tests).
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    #[instrument(skip(self, messages), fields(message_count = messages.len()))]
    async fn chat(&self, model: &str, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        let request = ChatRequest {
            model,
            messages: &messages,
            stream: false,
        };

        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        let body: ChatResponse = match serde_json::from_str(&raw) {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                return Err(LlmError::InvalidResponse(e.to_string()));
            }
            Err(_) => return Err(LlmError::Api(format!("status {status}"))),
        };

        if let Some(error) = body.error {
            return Err(LlmError::Api(error));
        }
        if !status.is_success() {
            return Err(LlmError::Api(format!("status {status}")));
        }

        let message = body
            .message
            .ok_or_else(|| LlmError::InvalidResponse("missing message field".to_string()))?;
        debug!(model = %model, reply_len = message.content.len(), "Chat completion returned");
        Ok(message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(role: &str, content: &str) -> ChatMessage {
        ChatMessage {
            role: role.to_string(),
            content: content.to_string(),
            images: None,
        }
    }

    #[test]
    fn test_request_serializes_without_empty_images() {
        let messages = vec![message("user", "hi")];
        let request = ChatRequest {
            model: "gemma3:4b",
            messages: &messages,
            stream: false,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(
            json,
            r#"{"model":"gemma3:4b","messages":[{"role":"user","content":"hi"}],"stream":false}"#
        );
    }

    #[tokio::test]
    async fn test_chat_returns_reply_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":{"role":"assistant","content":"hello there"}}"#)
            .create_async()
            .await;

        let client = OllamaClient::with_base_url(server.url());
        let reply = client
            .chat("gemma3:4b", vec![message("user", "hi")])
            .await
            .unwrap();

        assert_eq!(reply, "hello there");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_chat_surfaces_backend_error_field() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"model not found"}"#)
            .create_async()
            .await;

        let client = OllamaClient::with_base_url(server.url());
        let err = client
            .chat("missing", vec![message("user", "hi")])
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Api(ref m) if m == "model not found"));
    }

    #[tokio::test]
    async fn test_chat_rejects_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = OllamaClient::with_base_url(server.url());
        let err = client
            .chat("gemma3:4b", vec![message("user", "hi")])
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_chat_rejects_missing_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = OllamaClient::with_base_url(server.url());
        let err = client
            .chat("gemma3:4b", vec![message("user", "hi")])
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }
}
