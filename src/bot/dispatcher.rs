use std::time::Duration;

use anyhow::{Error, Result};

use super::commands::Command;
use super::templates::Templates;
use crate::ai::chat::{Chat, EMPTY_ANSWER_APOLOGY};
use crate::ai::models::{InMemoryModelSettings, ModelSettings};
use crate::ai::request::CompletionOptions;
use crate::ai::tools::WebSearchTool;
use crate::chat::ConversationStore;
use crate::core::AppConfig;
use crate::openai::{self, BoxedToolCall};
use crate::telegram::{ApiError, ParseMode, TelegramClient, Update};

const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Relays chat messages to the completion API and answers back.
///
/// Updates are handled one at a time, start to finish, so a
/// conversation's transcript is never loaded twice concurrently.
pub struct Bot {
    pub(super) config: AppConfig,
    pub(super) telegram: TelegramClient,
    pub(super) store: ConversationStore,
    pub(super) settings: Box<dyn ModelSettings + Send + Sync>,
    pub(super) tools: Vec<BoxedToolCall>,
    pub(super) templates: Templates,
}

impl Bot {
    pub fn new(config: AppConfig, telegram: TelegramClient) -> Result<Self, Error> {
        let store = ConversationStore::new(config.history_path(), &config.system_message);
        let settings = Box::new(InMemoryModelSettings::new(&config.default_model));
        let tools: Vec<BoxedToolCall> = vec![Box::new(WebSearchTool::new(
            config.google_search_api_key.as_deref(),
            config.google_search_cx_id.as_deref(),
        ))];
        let templates = Templates::new()?;

        Ok(Self {
            config,
            telegram,
            store,
            settings,
            tools,
            templates,
        })
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn settings(&self) -> &dyn ModelSettings {
        self.settings.as_ref()
    }

    /// Long polls for updates forever. Polling errors are logged and
    /// retried after a short delay.
    pub async fn run(&mut self) -> Result<(), Error> {
        let me = self.telegram.get_me().await?;
        tracing::info!(
            "Bot @{} started. Chat history is stored in {}",
            me.username.unwrap_or(me.first_name),
            self.store.dir().display()
        );

        let mut offset = 0;
        loop {
            let updates = match self
                .telegram
                .get_updates(offset, self.config.poll_timeout_secs)
                .await
            {
                Ok(updates) => updates,
                Err(e) => {
                    tracing::error!("Polling for updates failed: {}", e);
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = update.update_id + 1;
                self.handle_update(update).await;
            }
        }
    }

    /// Routes a single update to its handler. Never fails, handlers
    /// report problems to the user themselves.
    pub async fn handle_update(&mut self, update: Update) {
        if let Some(query) = update.callback_query {
            self.handle_callback(query).await;
            return;
        }

        let Some(message) = update.message else {
            tracing::debug!("Ignoring update {}", update.update_id);
            return;
        };

        if message.photo.is_some() {
            self.handle_photo(&message).await;
            return;
        }

        let Some(text) = message.text.clone() else {
            tracing::debug!("Ignoring message without text in chat {}", message.chat.id);
            return;
        };

        match Command::parse(&text) {
            Some(Command::Start) | Some(Command::Help) => self.handle_welcome(&message).await,
            Some(Command::Menu) => self.handle_menu(&message).await,
            Some(Command::New) => self.handle_new(&message).await,
            Some(Command::Image(prompt)) => self.handle_image(&message, prompt).await,
            None => self.handle_text(&message, &text).await,
        }
    }

    /// Runs one user turn through the model, persisting the transcript
    /// on success, and returns the answer.
    pub(super) async fn complete(
        &self,
        chat_id: i64,
        msg: openai::Message,
    ) -> Result<String, Error> {
        let transcript = self.store.load(chat_id).await;
        let profile = self.settings.get(chat_id);
        tracing::debug!(
            "Using model {} with {} messages of history for chat {}",
            profile.id,
            transcript.len(),
            chat_id
        );

        let options = CompletionOptions {
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };
        let mut chat = Chat::builder(
            &self.config.openai_api_hostname,
            &self.config.openai_api_key,
            profile,
        )
        .transcript(transcript)
        .tools(&self.tools)
        .options(options)
        .build();

        let messages = chat.next_msg(msg).await?;
        self.store.save(chat_id, chat.transcript()).await;

        let answer = messages
            .last()
            .and_then(|m| m.text())
            .unwrap_or(EMPTY_ANSWER_APOLOGY);
        Ok(answer.to_string())
    }

    /// Sends one message as Markdown, resending it as plain text if
    /// Telegram can't parse the markup.
    async fn send_chunk(
        &self,
        chat_id: i64,
        reply_to: Option<i64>,
        text: &str,
    ) -> Result<(), Error> {
        let result = self
            .telegram
            .send_message(chat_id, text, Some(ParseMode::Markdown), reply_to, None)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_markup_error(&e) => {
                tracing::warn!("Markdown rejected for chat {}: {}", chat_id, e);
                self.telegram
                    .send_message(chat_id, text, None, reply_to, None)
                    .await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Sends `text` as Markdown, split over several messages when it is
    /// longer than Telegram allows. Only the first one quotes `reply_to`.
    pub(super) async fn send_markdown(
        &self,
        chat_id: i64,
        reply_to: Option<i64>,
        text: &str,
    ) -> Result<(), Error> {
        for (i, chunk) in split_message(text, MAX_MESSAGE_LEN).into_iter().enumerate() {
            let reply_to = if i == 0 { reply_to } else { None };
            self.send_chunk(chat_id, reply_to, chunk).await?;
        }
        Ok(())
    }

    /// Sends a model answer, falling back to `failure_text` when the
    /// answer itself can't be delivered.
    pub(super) async fn deliver_answer(
        &self,
        chat_id: i64,
        reply_to: i64,
        answer: &str,
        failure_text: &str,
    ) {
        if let Err(e) = self.send_markdown(chat_id, Some(reply_to), answer).await {
            tracing::error!("Failed to deliver answer in chat {}: {}", chat_id, e);
            self.reply(chat_id, reply_to, failure_text).await;
        }
    }

    /// Like `send_markdown` but only logs failures.
    pub(super) async fn reply(&self, chat_id: i64, reply_to: i64, text: &str) {
        if let Err(e) = self.send_markdown(chat_id, Some(reply_to), text).await {
            tracing::error!("Failed to reply in chat {}: {}", chat_id, e);
        }
    }
}

/// Telegram's limit on message text, counted in UTF-16 code units.
pub(super) const MAX_MESSAGE_LEN: usize = 4096;

/// Splits `text` into pieces of at most `limit` UTF-16 code units,
/// breaking after the last newline that fits when there is one.
pub(super) fn split_message(text: &str, limit: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let mut units = 0;
        let mut end = rest.len();
        let mut after_newline = None;
        for (i, c) in rest.char_indices() {
            if units + c.len_utf16() > limit {
                end = i;
                break;
            }
            units += c.len_utf16();
            if c == '\n' {
                after_newline = Some(i + 1);
            }
        }
        if end < rest.len() {
            end = after_newline.unwrap_or(end);
        }
        if end == 0 {
            end = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }

        let (chunk, tail) = rest.split_at(end);
        chunks.push(chunk);
        rest = tail;
    }
    chunks
}

pub(super) fn is_markup_error(err: &Error) -> bool {
    err.downcast_ref::<ApiError>()
        .is_some_and(ApiError::is_markup_error)
}

pub(super) fn is_not_modified_error(err: &Error) -> bool {
    err.downcast_ref::<ApiError>()
        .is_some_and(|e| e.description.contains("message is not modified"))
}
