use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::core::AppConfig;

pub mod chat;
pub mod check;
pub mod models;
pub mod serve;

#[derive(Subcommand)]
enum Command {
    /// Run the Telegram bot
    Serve {},
    /// Chat with the assistant in the terminal
    Chat {
        /// Conversation to continue, shares history with the bot
        #[arg(long, default_value = "0")]
        chat_id: i64,
    },
    /// Check connectivity to Telegram and every supported model
    Check {},
    /// List chat models available to the API key
    Models {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::default();

    match args.command {
        Some(Command::Serve {}) => {
            serve::run(config).await?;
        }
        Some(Command::Chat { chat_id }) => {
            chat::run(config, chat_id).await?;
        }
        Some(Command::Check {}) => {
            check::run(config).await?;
        }
        Some(Command::Models {}) => {
            models::run(config).await?;
        }
        None => {}
    }

    Ok(())
}
