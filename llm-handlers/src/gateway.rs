//! Model gateway: selects the model variant from the content kind and invokes
//! the backend with the full context sequence.

use gbot_core::{ContentKind, Role, Turn};
use llm_client::{ChatMessage, LlmClient, LlmError};
use std::sync::Arc;
use tracing::{info, instrument};

/// Holds the backend client and the two configured model names.
#[derive(Clone)]
pub struct ModelGateway {
    client: Arc<dyn LlmClient>,
    text_model: String,
    vision_model: String,
}

impl ModelGateway {
    pub fn new(
        client: Arc<dyn LlmClient>,
        text_model: impl Into<String>,
        vision_model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            text_model: text_model.into(),
            vision_model: vision_model.into(),
        }
    }

    /// Image units go to the multimodal model; text and document units to the
    /// text model.
    pub fn select_model(&self, kind: ContentKind) -> &str {
        match kind {
            ContentKind::Image => &self.vision_model,
            ContentKind::Text | ContentKind::Document => &self.text_model,
        }
    }

    /// One blocking attempt against the backend with the whole context. No
    /// retry, no timeout; the error is the caller's to map.
    #[instrument(skip(self, context))]
    pub async fn invoke(&self, context: &[Turn], kind: ContentKind) -> Result<String, LlmError> {
        let model = self.select_model(kind).to_string();
        let messages: Vec<ChatMessage> = context.iter().map(turn_to_message).collect();
        info!(model = %model, messages = messages.len(), "step: invoking model backend");
        self.client.chat(&model, messages).await
    }
}

/// Converts a single [`Turn`] into the backend message format.
fn turn_to_message(turn: &Turn) -> ChatMessage {
    ChatMessage {
        role: match turn.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
        .to_string(),
        content: turn.content.clone(),
        images: turn.images.clone(),
    }
}
