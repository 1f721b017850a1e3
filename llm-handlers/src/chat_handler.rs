//! The dispatch path: engage decision, normalization, context append, model
//! invocation, and reply delivery, as one chain [`Handler`].

use crate::formatter;
use crate::gateway::ModelGateway;
use crate::normalizer::{Normalized, Normalizer};
use crate::trigger;
use async_trait::async_trait;
use base64::Engine;
use gbot_core::{
    Bot, Chat, ContentKind, ContentUnit, GbotError, Handler, HandlerResponse, Incoming, Result,
    Turn,
};
use std::sync::Arc;
use storage::ContextStore;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

/// Fixed reply when a PDF yields no extractable text; the model is not called.
pub const EMPTY_DOCUMENT_REPLY: &str = "Could not extract any text from the document.";

/// Answers engaged messages with a model reply, keeping the per-user context.
pub struct ChatHandler {
    bot: Arc<dyn Bot>,
    store: Arc<dyn ContextStore>,
    gateway: ModelGateway,
    normalizer: Normalizer,
    /// Bot username cache, populated by the runner's get_me before polling.
    bot_username: Arc<RwLock<Option<String>>>,
}

impl ChatHandler {
    pub fn new(
        bot: Arc<dyn Bot>,
        store: Arc<dyn ContextStore>,
        gateway: ModelGateway,
        normalizer: Normalizer,
        bot_username: Arc<RwLock<Option<String>>>,
    ) -> Self {
        Self {
            bot,
            store,
            gateway,
            normalizer,
            bot_username,
        }
    }

    async fn mention_token(&self) -> String {
        self.bot_username
            .read()
            .await
            .as_ref()
            .map(|username| format!("@{username}"))
            .unwrap_or_default()
    }

    /// Builds the user turn from a content unit; image units embed the
    /// materialized file as a base64 payload.
    async fn user_turn(&self, unit: &ContentUnit) -> anyhow::Result<Turn> {
        match (unit.kind, unit.media_path.as_deref()) {
            (ContentKind::Image, Some(path)) => {
                let bytes = tokio::fs::read(path).await?;
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                Ok(Turn::user_with_images(unit.text.clone(), vec![encoded]))
            }
            _ => Ok(Turn::user(unit.text.clone())),
        }
    }

    /// Delivery failures are logged and swallowed; the exchange is already
    /// decided by the time we send.
    async fn send_plain(&self, chat: &Chat, text: &str) {
        if let Err(e) = self.bot.send_message(chat, text).await {
            error!(error = %e, chat_id = chat.id, "Failed to deliver reply");
        }
    }
}

#[async_trait]
impl Handler for ChatHandler {
    #[instrument(skip(self, message))]
    async fn handle(&self, message: &Incoming) -> Result<HandlerResponse> {
        let text = message.event.text();
        let mention = self.mention_token().await;

        if !trigger::should_engage(
            message.chat.is_private,
            text,
            &mention,
            message.reply_to_bot,
        ) {
            debug!(
                user_id = message.user.id,
                chat_id = message.chat.id,
                "Not engaged, passing on"
            );
            return Ok(HandlerResponse::Continue);
        }

        // Strip the mention only when it is what triggered engagement.
        let via_mention = !message.chat.is_private
            && !message.reply_to_bot
            && trigger::is_mentioned(text, &mention);
        let event = if via_mention {
            message.event.with_text(trigger::strip_mention(text, &mention))
        } else {
            message.event.clone()
        };

        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            via_mention,
            "step: engaged, normalizing input"
        );

        let normalized = self
            .normalizer
            .normalize(message.user.id, &event)
            .await
            .map_err(|e| GbotError::Media(e.to_string()))?;

        let (unit, media) = match normalized {
            Normalized::Reject { reply } => {
                self.send_plain(&message.chat, &reply).await;
                return Ok(HandlerResponse::Reply(reply));
            }
            Normalized::EmptyDocument => {
                self.send_plain(&message.chat, EMPTY_DOCUMENT_REPLY).await;
                return Ok(HandlerResponse::Reply(EMPTY_DOCUMENT_REPLY.to_string()));
            }
            Normalized::Unit { unit, media } => (unit, media),
        };

        let user_id = message.user.id.to_string();
        let user_turn = self
            .user_turn(&unit)
            .await
            .map_err(|e| GbotError::Media(e.to_string()))?;
        let context = self
            .store
            .append(&user_id, user_turn)
            .await
            .map_err(|e| GbotError::Storage(e.to_string()))?;

        // Fail-open: a backend failure becomes an inline reply that joins the
        // history like any other assistant turn.
        let reply = match self.gateway.invoke(&context, unit.kind).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    error = %e,
                    user_id = message.user.id,
                    "Model backend failed, replying inline"
                );
                format!("Error interacting with AI model: {e}")
            }
        };
        // Temp media is released right after the model call, success or not.
        drop(media);

        self.store
            .append(&user_id, Turn::assistant(reply.clone()))
            .await
            .map_err(|e| GbotError::Storage(e.to_string()))?;

        let html = formatter::format(&reply);
        if let Err(e) = self.bot.send_html(&message.chat, &html).await {
            error!(error = %e, chat_id = message.chat.id, "Failed to deliver reply");
        }

        info!(
            user_id = message.user.id,
            reply_len = reply.len(),
            "step: reply delivered"
        );
        Ok(HandlerResponse::Reply(reply))
    }
}
