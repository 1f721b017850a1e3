//! Builds the bot's components and handler chain from configuration.

use crate::chain::HandlerChain;
use crate::config::BotConfig;
use crate::fetcher::TelegramMediaFetcher;
use gbot_core::{Bot, TelegramBot};
use llm_client::{LlmClient, OllamaClient};
use llm_handlers::{ChatHandler, InteractionLogHandler, MediaFetcher, ModelGateway, Normalizer};
use std::sync::Arc;
use storage::{ContextStore, JsonContextStore};
use tokio::sync::RwLock;

/// Everything the runner needs: the teloxide bot for polling, the username
/// cache it populates, and the assembled chain.
#[derive(Clone)]
pub struct BotComponents {
    pub teloxide_bot: teloxide::Bot,
    pub bot_username: Arc<RwLock<Option<String>>>,
    pub handler_chain: HandlerChain,
}

/// Wires store, gateway, normalizer, and handlers from the config.
pub fn build_components(config: &BotConfig) -> BotComponents {
    let teloxide_bot = teloxide::Bot::new(config.bot_token.clone());

    let bot: Arc<dyn Bot> = Arc::new(TelegramBot::new(teloxide_bot.clone()));
    let store: Arc<dyn ContextStore> = Arc::new(JsonContextStore::new(
        &config.context_store_path,
        config.instructions.clone(),
    ));
    let client: Arc<dyn LlmClient> =
        Arc::new(OllamaClient::with_base_url(config.ollama_base_url.clone()));
    let gateway = ModelGateway::new(
        client,
        config.text_model.clone(),
        config.vision_model.clone(),
    );
    let fetcher: Arc<dyn MediaFetcher> =
        Arc::new(TelegramMediaFetcher::new(teloxide_bot.clone()));
    let normalizer = Normalizer::new(&config.tmp_media_dir, fetcher);
    let bot_username = Arc::new(RwLock::new(None));

    let chat_handler = Arc::new(ChatHandler::new(
        bot,
        store,
        gateway,
        normalizer,
        bot_username.clone(),
    ));
    let log_handler = Arc::new(InteractionLogHandler::new(&config.interaction_log_file));

    let handler_chain = HandlerChain::new()
        .add_handler(chat_handler)
        .add_handler(log_handler);

    BotComponents {
        teloxide_bot,
        bot_username,
        handler_chain,
    }
}
