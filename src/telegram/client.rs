//! Minimal Telegram Bot API client over HTTP.
use std::fmt;
use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::types::{
    ChatAction, File, InlineKeyboardMarkup, Message, ParseMode, Update, User,
};

pub const TELEGRAM_API_HOSTNAME: &str = "https://api.telegram.org";

/// An error reported by the Bot API itself (`"ok": false`).
#[derive(Debug, Clone)]
pub struct ApiError {
    pub method: String,
    pub error_code: i64,
    pub description: String,
}

impl ApiError {
    /// Telegram rejected the message's Markdown.
    pub fn is_markup_error(&self) -> bool {
        self.error_code == 400 && self.description.contains("can't parse entities")
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Telegram {} failed ({}): {}",
            self.method, self.error_code, self.description
        )
    }
}

impl std::error::Error for ApiError {}

// Leaves room for the server side long poll to finish first
fn poll_request_timeout(timeout_secs: u64) -> Duration {
    Duration::from_secs(timeout_secs.saturating_add(10))
}

#[derive(Deserialize)]
struct Envelope<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Clone)]
pub struct TelegramClient {
    api_hostname: String,
    token: String,
    client: reqwest::Client,
}

impl TelegramClient {
    pub fn new(api_hostname: &str, token: &str) -> Self {
        Self {
            api_hostname: api_hostname.trim_end_matches("/").to_string(),
            token: token.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_hostname, self.token, method)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: Value,
        timeout: Duration,
    ) -> Result<T, Error> {
        let resp = self
            .client
            .post(self.method_url(method))
            .json(&payload)
            .timeout(timeout)
            .send()
            .await?;
        let envelope: Envelope<T> = resp.json().await?;

        if !envelope.ok {
            return Err(ApiError {
                method: method.to_string(),
                error_code: envelope.error_code.unwrap_or_default(),
                description: envelope.description.unwrap_or_default(),
            }
            .into());
        }
        envelope
            .result
            .ok_or(anyhow!("Telegram {} returned no result", method))
    }

    pub async fn get_me(&self) -> Result<User, Error> {
        self.call("getMe", json!({}), Duration::from_secs(30)).await
    }

    /// Long polls for updates after `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, Error> {
        let payload = json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message", "callback_query"],
        });
        self.call("getUpdates", payload, poll_request_timeout(timeout_secs))
            .await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
        reply_to: Option<i64>,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message, Error> {
        let mut payload = json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(mode) = parse_mode {
            payload["parse_mode"] = json!(mode);
        }
        if let Some(message_id) = reply_to {
            payload["reply_parameters"] = json!({"message_id": message_id});
        }
        if let Some(markup) = reply_markup {
            payload["reply_markup"] = json!(markup);
        }
        self.call("sendMessage", payload, Duration::from_secs(30))
            .await
    }

    /// Sends a photo by URL.
    pub async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        caption: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<Message, Error> {
        let mut payload = json!({
            "chat_id": chat_id,
            "photo": photo_url,
            "caption": caption,
        });
        if let Some(mode) = parse_mode {
            payload["parse_mode"] = json!(mode);
        }
        self.call("sendPhoto", payload, Duration::from_secs(60))
            .await
    }

    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), Error> {
        let mut payload = json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
        });
        if let Some(mode) = parse_mode {
            payload["parse_mode"] = json!(mode);
        }
        if let Some(markup) = reply_markup {
            payload["reply_markup"] = json!(markup);
        }
        // Returns the edited message or `true`, neither is needed
        let _: Value = self
            .call("editMessageText", payload, Duration::from_secs(30))
            .await?;
        Ok(())
    }

    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), Error> {
        let payload = json!({"chat_id": chat_id, "message_id": message_id});
        let _: bool = self
            .call("deleteMessage", payload, Duration::from_secs(30))
            .await?;
        Ok(())
    }

    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
    ) -> Result<(), Error> {
        let mut payload = json!({"callback_query_id": callback_query_id});
        if let Some(text) = text {
            payload["text"] = json!(text);
        }
        let _: bool = self
            .call("answerCallbackQuery", payload, Duration::from_secs(30))
            .await?;
        Ok(())
    }

    pub async fn send_chat_action(&self, chat_id: i64, action: ChatAction) -> Result<(), Error> {
        let payload = json!({"chat_id": chat_id, "action": action});
        let _: bool = self
            .call("sendChatAction", payload, Duration::from_secs(30))
            .await?;
        Ok(())
    }

    pub async fn get_file(&self, file_id: &str) -> Result<File, Error> {
        self.call(
            "getFile",
            json!({"file_id": file_id}),
            Duration::from_secs(30),
        )
        .await
    }

    /// Downloads the contents of a file returned by `get_file`.
    pub async fn download_file(&self, file_path: &str) -> Result<Vec<u8>, Error> {
        let url = format!("{}/file/bot{}/{}", self.api_hostname, self.token, file_path);
        let bytes = self
            .client
            .get(url)
            .timeout(Duration::from_secs(60))
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}
