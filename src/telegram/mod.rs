pub mod client;
pub use client::{ApiError, TELEGRAM_API_HOSTNAME, TelegramClient};

pub mod types;
pub use types::*;
