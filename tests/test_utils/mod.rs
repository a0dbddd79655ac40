//! Test utilities for integration tests
use serde_json::{Value, json};
use tempfile::TempDir;

use chatrelay::bot::Bot;
use chatrelay::core::AppConfig;
use chatrelay::telegram::{TelegramClient, Update};

pub const TOKEN: &str = "test-token";
pub const CHAT_ID: i64 = 42;

pub fn test_config(storage_path: &str, server_url: &str) -> AppConfig {
    AppConfig {
        storage_path: storage_path.to_string(),
        telegram_bot_token: Some(TOKEN.to_string()),
        telegram_api_hostname: server_url.to_string(),
        openai_api_hostname: server_url.to_string(),
        openai_api_key: String::from("test-api-key"),
        default_model: String::from("gpt-4o-mini"),
        image_model: String::from("dall-e-3"),
        max_tokens: 4000,
        temperature: None,
        google_search_api_key: None,
        google_search_cx_id: None,
        system_message: String::from("You are a helpful assistant."),
        poll_timeout_secs: 0,
    }
}

/// Creates a bot that talks to `server_url` for both Telegram and
/// OpenAI, storing history in a temporary directory. Keep the
/// returned `TempDir` alive for the duration of the test.
pub fn test_bot(server_url: &str) -> (Bot, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&dir.path().display().to_string(), server_url);
    let bot = Bot::new(config, TelegramClient::new(server_url, TOKEN))
        .expect("Failed to create bot");
    (bot, dir)
}

pub fn text_update(update_id: i64, text: &str) -> Update {
    serde_json::from_value(json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id * 10,
            "chat": {"id": CHAT_ID, "type": "private"},
            "text": text
        }
    }))
    .expect("Invalid text update")
}

pub fn photo_update(update_id: i64, caption: Option<&str>) -> Update {
    let mut message = json!({
        "message_id": update_id * 10,
        "chat": {"id": CHAT_ID, "type": "private"},
        "photo": [
            {"file_id": "small", "file_unique_id": "s", "width": 90, "height": 90},
            {"file_id": "large", "file_unique_id": "l", "width": 800, "height": 600}
        ]
    });
    if let Some(caption) = caption {
        message["caption"] = json!(caption);
    }
    serde_json::from_value(json!({"update_id": update_id, "message": message}))
        .expect("Invalid photo update")
}

pub fn callback_update(update_id: i64, data: &str) -> Update {
    serde_json::from_value(json!({
        "update_id": update_id,
        "callback_query": {
            "id": format!("cb{}", update_id),
            "data": data,
            "message": {"message_id": 7, "chat": {"id": CHAT_ID, "type": "private"}}
        }
    }))
    .expect("Invalid callback update")
}

pub fn telegram_ok(result: Value) -> String {
    json!({"ok": true, "result": result}).to_string()
}

pub fn sent_message(message_id: i64) -> String {
    telegram_ok(json!({"message_id": message_id, "chat": {"id": CHAT_ID}}))
}

pub fn completion_body(content: &str) -> String {
    json!({
        "choices": [{
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

/// Matches completion requests that don't offer any tools to the model.
pub fn offers_no_tools(request: &mockito::Request) -> bool {
    request
        .utf8_lossy_body()
        .is_ok_and(|body| !body.contains(r#""tools""#) && !body.contains(r#""tool_choice""#))
}
