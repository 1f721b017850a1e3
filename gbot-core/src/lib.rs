//! # gbot-core
//!
//! Core types and traits for the bot: [`Bot`], [`Handler`], the inbound event
//! union, conversation turns, and tracing initialization. Transport-agnostic;
//! used by storage, llm-handlers, and telegram-bot.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::{Bot, TelegramBot};
pub use error::{GbotError, Result};
pub use logger::init_tracing;
pub use types::{
    Chat, ContentKind, ContentUnit, Handler, HandlerResponse, InboundEvent, Incoming,
    PhotoAttachment, Role, Turn, User,
};
