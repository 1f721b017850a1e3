//! Telegram implementation of [`MediaFetcher`]: resolves a file id and
//! downloads its bytes through the Bot API.

use async_trait::async_trait;
use llm_handlers::MediaFetcher;
use teloxide::prelude::*;
use teloxide::types::FileId;
use tracing::debug;

pub struct TelegramMediaFetcher {
    bot: teloxide::Bot,
}

impl TelegramMediaFetcher {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MediaFetcher for TelegramMediaFetcher {
    async fn fetch(&self, file_id: &str) -> anyhow::Result<Vec<u8>> {
        let file = self.bot.get_file(FileId(file_id.to_string())).await?;
        let mut buf = Vec::new();
        teloxide::net::Download::download_file(&self.bot, &file.path, &mut buf).await?;
        debug!(file_id = %file_id, bytes = buf.len(), "Downloaded attachment");
        Ok(buf)
    }
}
