//! # Handler chain
//!
//! Runs a sequence of handlers: handle runs in order until one returns Reply,
//! then all after run in reverse with the final response.

use gbot_core::{Handler, HandlerResponse, Incoming, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Chain of handlers: handle (until Reply) → after (reverse).
#[derive(Clone)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Appends a handler.
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Runs handle until Reply, then all after in reverse.
    #[instrument(skip(self, message))]
    pub async fn handle(&self, message: &Incoming) -> Result<HandlerResponse> {
        let mut final_response = HandlerResponse::Continue;

        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            "step: handler_chain started"
        );

        for h in &self.handlers {
            let name = std::any::type_name_of_val(h.as_ref());
            let response = h.handle(message).await?;
            debug!(handler = %name, response = ?response, "Handler processed");
            if let HandlerResponse::Reply(_) = response {
                info!(user_id = message.user.id, handler = %name, "step: chain stopped by handler");
                final_response = response;
                break;
            }
        }

        for h in self.handlers.iter().rev() {
            h.after(message, &final_response).await?;
        }

        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            "step: handler_chain finished"
        );

        Ok(final_response)
    }
}

impl Default for HandlerChain {
    fn default() -> Self {
        Self::new()
    }
}

// Unit/integration tests live in tests/chain_test.rs
