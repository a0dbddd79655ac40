use std::time::Instant;

use anyhow::Result;

use crate::ai::models::MODELS;
use crate::ai::request::{CompletionOptions, build_completion_payload};
use crate::core::AppConfig;
use crate::openai::{Message, Role, completion};
use crate::telegram::TelegramClient;

/// Verifies the bot token and sends a tiny completion to each
/// supported model, printing how long each one took.
pub async fn run(config: AppConfig) -> Result<()> {
    match &config.telegram_bot_token {
        Some(token) => {
            let telegram = TelegramClient::new(&config.telegram_api_hostname, token);
            match telegram.get_me().await {
                Ok(me) => println!(
                    "Telegram: ok (@{})",
                    me.username.unwrap_or(me.first_name)
                ),
                Err(e) => println!("Telegram: failed ({})", e),
            }
        }
        None => println!("Telegram: TG_BOT_TOKEN is not set"),
    }

    let options = CompletionOptions {
        max_tokens: 50,
        temperature: config.temperature,
    };
    let messages = vec![Message::new(Role::User, "Reply with the single word: pong")];

    for profile in MODELS.iter() {
        let payload = build_completion_payload(profile, &messages, None, &options);
        let start = Instant::now();
        let result = completion(&payload, &config.openai_api_hostname, &config.openai_api_key).await;
        let elapsed = start.elapsed().as_secs_f64();

        match result {
            Ok(resp) => {
                let answer = resp
                    .message()
                    .ok()
                    .and_then(|m| m.content.clone())
                    .unwrap_or_default();
                println!("{}: ok in {:.2} sec ({})", profile.id, elapsed, answer.trim());
            }
            Err(e) => println!("{}: failed after {:.2} sec ({})", profile.id, elapsed, e),
        }
    }

    Ok(())
}
