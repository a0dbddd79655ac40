use std::env;
use std::path::PathBuf;

use crate::telegram::TELEGRAM_API_HOSTNAME;

const DEFAULT_SYSTEM_MESSAGE: &str = r"You are a helpful assistant in a Telegram bot with access to real-time internet information.

IMPORTANT: You have access to the google_search function to find current information on the internet. When users ask about:
- Current weather, news, events
- Recent information, prices, schedules
- Any time-sensitive data
USE the google_search function to provide accurate, up-to-date answers based on the search results.

Format your responses using Markdown:
- Use **bold** for important words and key concepts
- Use `code` for technical terms, commands, or code snippets
- Use ```language for multi-line code blocks
- Use bullet points or numbered lists when listing items
- Use appropriate emojis sparingly and only when contextually relevant

Guidelines:
- Be concise and clear
- Structure your answers well
- Make important information stand out with bold text
- ALWAYS use search results when provided - don't say you don't have access to real-time data";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub telegram_bot_token: Option<String>,
    pub telegram_api_hostname: String,
    pub openai_api_hostname: String,
    pub openai_api_key: String,
    pub default_model: String,
    pub image_model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub google_search_api_key: Option<String>,
    pub google_search_cx_id: Option<String>,
    pub system_message: String,
    pub poll_timeout_secs: u64,
}

impl AppConfig {
    /// Directory holding one transcript file per conversation.
    pub fn history_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_path).join("chat_history")
    }
}

// Empty values are treated the same as unset so that a blank line in
// a deployment's env file doesn't count as configured.
fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("RELAY_STORAGE_PATH").unwrap_or("./".to_string());
        let telegram_bot_token = optional_var("TG_BOT_TOKEN");
        let telegram_api_hostname = env::var("RELAY_TELEGRAM_API_HOSTNAME")
            .unwrap_or_else(|_| TELEGRAM_API_HOSTNAME.to_string());
        let openai_api_hostname = env::var("RELAY_OPENAI_API_HOSTNAME")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let openai_api_key =
            env::var("OPENAI_API_KEY").unwrap_or_else(|_| "thiswontworkforopenai".to_string());
        let default_model =
            env::var("RELAY_DEFAULT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let image_model = env::var("RELAY_IMAGE_MODEL").unwrap_or_else(|_| "dall-e-3".to_string());
        let max_tokens = env::var("RELAY_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(4000);
        let temperature = env::var("RELAY_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse::<f32>().ok());
        let google_search_api_key = optional_var("GOOGLE_API_KEY");
        let google_search_cx_id = optional_var("GOOGLE_CX");
        let system_message =
            env::var("RELAY_SYSTEM_MESSAGE").unwrap_or_else(|_| DEFAULT_SYSTEM_MESSAGE.to_string());
        let poll_timeout_secs = env::var("RELAY_POLL_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        Self {
            storage_path,
            telegram_bot_token,
            telegram_api_hostname,
            openai_api_hostname,
            openai_api_key,
            default_model,
            image_model,
            max_tokens,
            temperature,
            google_search_api_key,
            google_search_cx_id,
            system_message,
            poll_timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "RELAY_STORAGE_PATH",
        "RELAY_DEFAULT_MODEL",
        "RELAY_MAX_TOKENS",
        "RELAY_TEMPERATURE",
        "GOOGLE_API_KEY",
        "GOOGLE_CX",
    ];

    fn clear_vars() {
        for key in VARS {
            // SAFETY: tests touching the environment are serialized
            unsafe { env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_vars();
        let config = AppConfig::default();
        assert_eq!(config.storage_path, "./");
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert_eq!(config.max_tokens, 4000);
        assert!(config.temperature.is_none());
        assert!(config.google_search_api_key.is_none());
        assert!(config.google_search_cx_id.is_none());
        assert!(config.system_message.contains("google_search"));
    }

    #[test]
    #[serial]
    fn test_reads_env() {
        clear_vars();
        unsafe {
            env::set_var("RELAY_STORAGE_PATH", "/tmp/relay");
            env::set_var("RELAY_DEFAULT_MODEL", "gpt-5");
            env::set_var("RELAY_MAX_TOKENS", "1234");
            env::set_var("RELAY_TEMPERATURE", "0.5");
            env::set_var("GOOGLE_API_KEY", "key");
            env::set_var("GOOGLE_CX", "   ");
        }
        let config = AppConfig::default();
        clear_vars();

        assert_eq!(config.history_path(), PathBuf::from("/tmp/relay/chat_history"));
        assert_eq!(config.default_model, "gpt-5");
        assert_eq!(config.max_tokens, 1234);
        assert_eq!(config.temperature, Some(0.5));
        assert_eq!(config.google_search_api_key.as_deref(), Some("key"));
        // Blank values count as unset
        assert!(config.google_search_cx_id.is_none());
    }

    #[test]
    #[serial]
    fn test_invalid_numbers_fall_back() {
        clear_vars();
        unsafe { env::set_var("RELAY_MAX_TOKENS", "lots") };
        let config = AppConfig::default();
        clear_vars();
        assert_eq!(config.max_tokens, 4000);
    }
}
