//! # llm-handlers
//!
//! The trigger-and-dispatch engine: engage decision, input normalization
//! (text/image/PDF), model gateway, reply formatting, and the chain handlers
//! wiring them together.

pub mod chat_handler;
pub mod formatter;
pub mod gateway;
pub mod log_handler;
pub mod normalizer;
pub mod trigger;

pub use chat_handler::{ChatHandler, EMPTY_DOCUMENT_REPLY};
pub use gateway::ModelGateway;
pub use log_handler::InteractionLogHandler;
pub use normalizer::{
    MediaFetcher, Normalized, Normalizer, TempMedia, DEFAULT_IMAGE_PROMPT,
    UNSUPPORTED_DOCUMENT_REPLY,
};
