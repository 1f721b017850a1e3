//! Handler that appends each completed exchange to a flat interaction log in
//! after(). Write failures are logged and swallowed.

use async_trait::async_trait;
use gbot_core::{Handler, HandlerResponse, Incoming, Result};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::{error, instrument};

/// Appends `[timestamp] UserID | Username / User / Bot` blocks to the given file.
pub struct InteractionLogHandler {
    path: PathBuf,
}

impl InteractionLogHandler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn append(&self, block: &str) -> std::io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(block.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Handler for InteractionLogHandler {
    #[instrument(skip(self, message, response))]
    async fn after(&self, message: &Incoming, response: &HandlerResponse) -> Result<()> {
        let HandlerResponse::Reply(reply) = response else {
            return Ok(());
        };

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let username = message.user.username.as_deref().unwrap_or("Unknown");
        let block = format!(
            "[{timestamp}] UserID: {} | Username: {}\nUser: {}\nBot: {}\n{}\n",
            message.user.id,
            username,
            message.event.text(),
            reply,
            "-".repeat(50),
        );

        if let Err(e) = self.append(&block).await {
            error!(error = %e, path = %self.path.display(), "Failed to write interaction log");
        }
        Ok(())
    }
}
