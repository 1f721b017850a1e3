//! Bot abstraction for sending replies.
//!
//! [`Bot`] trait is transport-agnostic; [`TelegramBot`] implements it via teloxide.

use crate::error::{GbotError, Result};
use crate::types::Chat;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};

/// Abstraction for sending messages. Implementations map to a transport (e.g. Telegram).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a plain-text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;
    /// Sends a message rendered with HTML markup (formatter output).
    async fn send_html(&self, chat: &Chat, text: &str) -> Result<()>;
}

/// Teloxide-based implementation of [`Bot`].
pub struct TelegramBot {
    bot: teloxide::Bot,
}

impl TelegramBot {
    /// Wraps an already-built teloxide bot (shared with the polling runner).
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Bot for TelegramBot {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text)
            .await
            .map_err(|e| GbotError::Bot(e.to_string()))?;
        Ok(())
    }

    async fn send_html(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text)
            .parse_mode(ParseMode::Html)
            .await
            .map_err(|e| GbotError::Bot(e.to_string()))?;
        Ok(())
    }
}
