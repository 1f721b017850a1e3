//! # telegram-bot
//!
//! Transport edge of gbot: teloxide adapters into the core event union, the
//! media fetcher, handler chain, configuration, and the long-polling runner.

pub mod adapters;
pub mod chain;
pub mod components;
pub mod config;
pub mod fetcher;
pub mod runner;

pub use adapters::TelegramMessageWrapper;
pub use chain::HandlerChain;
pub use components::{build_components, BotComponents};
pub use config::{load_instructions, BotConfig};
pub use fetcher::TelegramMediaFetcher;
pub use runner::{run_bot, START_GREETING};
