//! gbot binary: CLI entry for the Telegram ↔ local-model bridge.

use anyhow::Result;
use clap::{Parser, Subcommand};
use telegram_bot::{run_bot, BotConfig};

#[derive(Parser)]
#[command(name = "gbot", about = "Telegram bot bridging chats to a local Ollama backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot with long polling.
    Run {
        /// Bot token override; falls back to BOT_TOKEN, then the token file.
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = BotConfig::load(token)?;
            run_bot(config).await
        }
    }
}
