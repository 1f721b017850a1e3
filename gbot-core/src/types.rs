//! Core types: user, chat, inbound events, conversation turns, and the Handler trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// User identity (id and optional username).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
}

/// Chat identity. `is_private` drives the engage decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub is_private: bool,
}

/// Role of one conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One exchange unit in a conversation history. Immutable once appended.
/// `images` carries base64-encoded payloads and is present only on image turns;
/// the serialized form matches the durable store record `{ role, content, images? }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            images: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            images: None,
        }
    }

    pub fn user_with_images(content: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            images: Some(images),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            images: None,
        }
    }
}

/// A photo attachment candidate; the normalizer picks the highest-resolution one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoAttachment {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
}

/// Tagged inbound payload. Built by the transport adapter, dispatched into the
/// normalizer via exhaustive matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Text {
        text: String,
    },
    Image {
        caption: Option<String>,
        photos: Vec<PhotoAttachment>,
    },
    Document {
        caption: Option<String>,
        file_id: String,
        file_name: Option<String>,
        mime_type: Option<String>,
    },
}

impl InboundEvent {
    /// The textual part of the event: message text or caption ("" when absent).
    pub fn text(&self) -> &str {
        match self {
            InboundEvent::Text { text } => text,
            InboundEvent::Image { caption, .. } | InboundEvent::Document { caption, .. } => {
                caption.as_deref().unwrap_or("")
            }
        }
    }

    /// Same event with its textual part replaced. An empty replacement clears
    /// the caption so that caption-absent defaults still apply downstream.
    pub fn with_text(&self, new_text: String) -> InboundEvent {
        let caption = if new_text.is_empty() {
            None
        } else {
            Some(new_text.clone())
        };
        match self {
            InboundEvent::Text { .. } => InboundEvent::Text { text: new_text },
            InboundEvent::Image { photos, .. } => InboundEvent::Image {
                caption,
                photos: photos.clone(),
            },
            InboundEvent::Document {
                file_id,
                file_name,
                mime_type,
                ..
            } => InboundEvent::Document {
                caption,
                file_id: file_id.clone(),
                file_name: file_name.clone(),
                mime_type: mime_type.clone(),
            },
        }
    }
}

/// Kind of a normalized content unit; drives model selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Image,
    Document,
}

/// Normalized input ready for model invocation: text, optional materialized
/// media path, and the kind tag. Created per inbound event, consumed once.
#[derive(Debug, Clone)]
pub struct ContentUnit {
    pub text: String,
    pub media_path: Option<PathBuf>,
    pub kind: ContentKind,
}

/// One inbound message with its sender, chat, reply relation, and payload.
/// Ephemeral; discarded after the engage/ignore decision and dispatch.
#[derive(Debug, Clone)]
pub struct Incoming {
    pub user: User,
    pub chat: Chat,
    /// Whether this message replies to a message the bot itself sent.
    pub reply_to_bot: bool,
    pub event: InboundEvent,
}

/// Handler result for the chain. `Reply(text)` carries the response body so
/// later handlers can use it in `after()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Pass to next handler.
    Continue,
    /// Stop the chain and attach reply text (e.g. log it in a handler's `after()`).
    Reply(String),
}

/// Single handler concept: handle / optional after. The chain runs handle until
/// one handler returns Reply, then runs all after in reverse.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Processes the message. Return Reply to end the handle phase. Default: Continue.
    async fn handle(&self, _message: &Incoming) -> crate::error::Result<HandlerResponse> {
        Ok(HandlerResponse::Continue)
    }

    /// Runs after the handle phase (reverse order), with the final response.
    async fn after(
        &self,
        _message: &Incoming,
        _response: &HandlerResponse,
    ) -> crate::error::Result<()> {
        Ok(())
    }
}
