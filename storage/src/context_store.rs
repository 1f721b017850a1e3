//! Context store: bounded per-user conversation history with durable persistence.
//!
//! The durable format is one JSON document mapping user id to its ordered turn
//! list; the whole document is loaded at the start of each operation and
//! rewritten in full after each mutation. All operations serialize behind an
//! async mutex so concurrent appends for the same user cannot lose a turn.

use crate::error::StorageError;
use async_trait::async_trait;
use gbot_core::{Role, Turn};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Maximum number of turns kept per user, system preamble included.
pub const CONTEXT_WINDOW: usize = 20;

type ContextMap = HashMap<String, Vec<Turn>>;

/// Per-user conversation history with lazy system-preamble seeding.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Returns the user's context, creating and persisting a preamble-seeded
    /// one on first interaction.
    async fn get(&self, user_id: &str) -> Result<Vec<Turn>, StorageError>;

    /// Appends a turn, truncates to the window bound, persists, and returns
    /// the post-append context.
    async fn append(&self, user_id: &str, turn: Turn) -> Result<Vec<Turn>, StorageError>;
}

/// File-backed [`ContextStore`] over a single JSON document.
pub struct JsonContextStore {
    path: PathBuf,
    preamble: String,
    lock: Mutex<()>,
}

impl JsonContextStore {
    /// Creates a store over `path`. `preamble` seeds the system turn of every
    /// new user context (may be empty).
    pub fn new(path: impl Into<PathBuf>, preamble: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            preamble: preamble.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<ContextMap, StorageError> {
        if !self.path.exists() {
            return Ok(ContextMap::new());
        }
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn save(&self, contexts: &ContextMap) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let raw = serde_json::to_string_pretty(contexts)?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }

    fn seed(&self) -> Vec<Turn> {
        vec![Turn::system(self.preamble.clone())]
    }
}

/// Drops the oldest non-system turns until the context fits the window.
/// The system preamble at index 0 never ages out.
fn truncate_to_window(turns: &mut Vec<Turn>) {
    while turns.len() > CONTEXT_WINDOW {
        let head = if matches!(turns.first().map(|t| t.role), Some(Role::System)) {
            1
        } else {
            0
        };
        turns.remove(head);
    }
}

#[async_trait]
impl ContextStore for JsonContextStore {
    async fn get(&self, user_id: &str) -> Result<Vec<Turn>, StorageError> {
        let _guard = self.lock.lock().await;
        let mut contexts = self.load().await?;
        if let Some(turns) = contexts.get(user_id) {
            debug!(user_id = %user_id, turns = turns.len(), "Loaded existing context");
            return Ok(turns.clone());
        }
        let seeded = self.seed();
        contexts.insert(user_id.to_string(), seeded.clone());
        self.save(&contexts).await?;
        info!(user_id = %user_id, "Seeded new context with system preamble");
        Ok(seeded)
    }

    async fn append(&self, user_id: &str, turn: Turn) -> Result<Vec<Turn>, StorageError> {
        let _guard = self.lock.lock().await;
        let mut contexts = self.load().await?;
        let turns = contexts
            .entry(user_id.to_string())
            .or_insert_with(|| self.seed());
        turns.push(turn);
        truncate_to_window(turns);
        let snapshot = turns.clone();
        self.save(&contexts).await?;
        debug!(user_id = %user_id, turns = snapshot.len(), "Appended turn");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_system_turn() {
        let mut turns = vec![Turn::system("preamble")];
        for i in 0..30 {
            turns.push(Turn::user(format!("msg {i}")));
        }
        truncate_to_window(&mut turns);
        assert_eq!(turns.len(), CONTEXT_WINDOW);
        assert_eq!(turns[0].role, Role::System);
        assert_eq!(turns[0].content, "preamble");
        // Most recent turns survive verbatim.
        assert_eq!(turns.last().unwrap().content, "msg 29");
    }

    #[test]
    fn test_truncate_noop_below_window() {
        let mut turns = vec![Turn::system(""), Turn::user("hi")];
        truncate_to_window(&mut turns);
        assert_eq!(turns.len(), 2);
    }
}
