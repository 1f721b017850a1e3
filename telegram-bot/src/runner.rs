//! REPL runner: converts teloxide messages to the core envelope and passes
//! them to the handler chain. Calls get_me before polling to populate the
//! bot username used for mention detection.

use crate::adapters::TelegramMessageWrapper;
use crate::components::{build_components, BotComponents};
use crate::config::BotConfig;
use anyhow::Result;
use gbot_core::init_tracing;
use teloxide::prelude::*;
use tracing::{error, info, instrument};

/// Reply to the /start command.
pub const START_GREETING: &str = "Hi! I'm a bot backed by a locally hosted model.\n\
My replies follow the instructions file loaded at startup.";

/// Main entry: init logging, build components, then run the polling loop.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    std::fs::create_dir_all("logs")?;
    init_tracing(&config.log_file)?;
    std::fs::create_dir_all(&config.tmp_media_dir)?;

    info!(
        ollama_base_url = %config.ollama_base_url,
        text_model = %config.text_model,
        vision_model = %config.vision_model,
        context_store = %config.context_store_path,
        "Initializing bot"
    );

    let components = build_components(&config);

    info!("Bot started successfully");

    run_repl(components).await
}

/// Starts the REPL over the given components. Each message is converted to the
/// core envelope and handled in a spawned task so polling never blocks on a
/// model call.
pub async fn run_repl(components: BotComponents) -> Result<()> {
    let BotComponents {
        teloxide_bot,
        bot_username,
        handler_chain,
    } = components;

    let mut bot_user_id = None;
    if let Ok(me) = teloxide_bot.get_me().await {
        bot_user_id = Some(me.id);
        if let Some(username) = &me.user.username {
            *bot_username.write().await = Some(username.clone());
            info!(username = %username, "Bot username set before repl");
        }
    }

    let chain = handler_chain;
    teloxide::repl(
        teloxide_bot,
        move |bot: Bot, msg: teloxide::types::Message| {
            let chain = chain.clone();

            async move {
                if msg.text() == Some("/start") {
                    if let Err(e) = bot.send_message(msg.chat.id, START_GREETING).await {
                        error!(error = %e, chat_id = msg.chat.id.0, "Failed to send greeting");
                    }
                    return Ok(());
                }

                let wrapper = TelegramMessageWrapper {
                    message: &msg,
                    bot_user_id,
                };
                let Some(incoming) = wrapper.to_incoming() else {
                    info!(chat_id = msg.chat.id.0, "Received unsupported message kind");
                    return Ok(());
                };

                info!(
                    user_id = incoming.user.id,
                    chat_id = incoming.chat.id,
                    "Received message"
                );

                // Run the chain in a spawned task so the REPL returns immediately.
                tokio::spawn(async move {
                    if let Err(e) = chain.handle(&incoming).await {
                        error!(error = %e, user_id = incoming.user.id, "Handler chain failed");
                    }
                });

                Ok(())
            }
        },
    )
    .await;

    Ok(())
}
