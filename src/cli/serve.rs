use anyhow::{Result, anyhow};

use crate::bot::Bot;
use crate::core::AppConfig;
use crate::telegram::TelegramClient;

pub async fn run(config: AppConfig) -> Result<()> {
    let token = config
        .telegram_bot_token
        .clone()
        .ok_or(anyhow!("TG_BOT_TOKEN is not set"))?;
    if config.google_search_api_key.is_none() {
        tracing::warn!("GOOGLE_API_KEY is not set, web search will be unavailable");
    }

    let telegram = TelegramClient::new(&config.telegram_api_hostname, &token);
    let mut bot = Bot::new(config, telegram)?;
    bot.run().await
}
