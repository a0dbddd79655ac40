use anyhow::{Error, Result, anyhow};
use base64::{Engine as _, engine::general_purpose::STANDARD};

use super::commands::CallbackAction;
use super::dispatcher::{Bot, is_markup_error, is_not_modified_error};
use super::keyboards::{menu_keyboard, model_keyboard};
use super::templates::{
    CALLBACK_FAILED_TOAST, DEFAULT_PHOTO_PROMPT, IMAGE_FAILURE, IMAGE_PENDING, IMAGE_USAGE,
    PHOTO_FAILURE, RESET_DONE, RESET_TOAST, TEXT_FAILURE, UNKNOWN_MODEL_TOAST,
};
use crate::openai::{self, Role, generate_image};
use crate::telegram::{CallbackQuery, ChatAction, InlineKeyboardMarkup, Message, ParseMode};

impl Bot {
    async fn send_action(&self, chat_id: i64, action: ChatAction) {
        if let Err(e) = self.telegram.send_chat_action(chat_id, action).await {
            tracing::warn!("Failed to send {:?} action to chat {}: {}", action, chat_id, e);
        }
    }

    pub(super) async fn handle_welcome(&self, message: &Message) {
        let chat_id = message.chat.id;
        match self.templates.welcome(self.settings.get(chat_id)) {
            Ok(text) => self.reply(chat_id, message.message_id, &text).await,
            Err(e) => tracing::error!("Failed to render welcome message: {}", e),
        }
    }

    pub(super) async fn handle_new(&self, message: &Message) {
        let chat_id = message.chat.id;
        self.store.clear(chat_id).await;
        self.reply(chat_id, message.message_id, RESET_DONE).await;
    }

    pub(super) async fn handle_menu(&self, message: &Message) {
        let chat_id = message.chat.id;
        let result = match self.templates.menu(self.settings.get(chat_id)) {
            Ok(text) => self
                .telegram
                .send_message(
                    chat_id,
                    &text,
                    Some(ParseMode::Markdown),
                    None,
                    Some(&menu_keyboard()),
                )
                .await
                .map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::error!("Failed to show menu in chat {}: {}", chat_id, e);
        }
    }

    pub(super) async fn handle_text(&self, message: &Message, text: &str) {
        let chat_id = message.chat.id;
        self.send_action(chat_id, ChatAction::Typing).await;

        match self.complete(chat_id, openai::Message::new(Role::User, text)).await {
            Ok(answer) => {
                self.deliver_answer(chat_id, message.message_id, &answer, TEXT_FAILURE)
                    .await
            }
            Err(e) => {
                tracing::error!("Failed to answer message in chat {}: {:?}", chat_id, e);
                self.reply(chat_id, message.message_id, TEXT_FAILURE).await;
            }
        }
    }

    /// Downloads the largest variant of the photo and returns it as a
    /// data URI.
    async fn fetch_photo(&self, message: &Message) -> Result<String, Error> {
        let photo = message
            .largest_photo()
            .ok_or(anyhow!("Message has no photo"))?;
        let file = self.telegram.get_file(&photo.file_id).await?;
        let file_path = file
            .file_path
            .ok_or(anyhow!("File {} has no download path", photo.file_id))?;
        let bytes = self.telegram.download_file(&file_path).await?;
        Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes)))
    }

    pub(super) async fn handle_photo(&self, message: &Message) {
        let chat_id = message.chat.id;
        self.send_action(chat_id, ChatAction::Typing).await;

        let result = async {
            let image_url = self.fetch_photo(message).await?;
            let caption = message
                .caption
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(DEFAULT_PHOTO_PROMPT);
            self.complete(chat_id, openai::Message::new_with_image(caption, &image_url))
                .await
        }
        .await;

        match result {
            Ok(answer) => {
                self.deliver_answer(chat_id, message.message_id, &answer, PHOTO_FAILURE)
                    .await
            }
            Err(e) => {
                tracing::error!("Failed to analyze photo in chat {}: {:?}", chat_id, e);
                self.reply(chat_id, message.message_id, PHOTO_FAILURE).await;
            }
        }
    }

    async fn deliver_image(&self, chat_id: i64, prompt: &str) -> Result<(), Error> {
        let image = generate_image(
            prompt,
            &self.config.openai_api_hostname,
            &self.config.openai_api_key,
            &self.config.image_model,
        )
        .await?;
        let revised_prompt = image.revised_prompt.as_deref().unwrap_or(prompt);
        let caption = self.templates.image_caption(prompt, revised_prompt)?;

        match self
            .telegram
            .send_photo(chat_id, &image.url, &caption, Some(ParseMode::Markdown))
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if is_markup_error(&e) => {
                tracing::warn!("Caption markdown rejected for chat {}: {}", chat_id, e);
                self.telegram
                    .send_photo(chat_id, &image.url, &caption, None)
                    .await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub(super) async fn handle_image(&self, message: &Message, prompt: Option<String>) {
        let chat_id = message.chat.id;
        let Some(prompt) = prompt else {
            self.reply(chat_id, message.message_id, IMAGE_USAGE).await;
            return;
        };

        let status = match self
            .telegram
            .send_message(
                chat_id,
                IMAGE_PENDING,
                Some(ParseMode::Markdown),
                Some(message.message_id),
                None,
            )
            .await
        {
            Ok(status) => status,
            Err(e) => {
                tracing::error!("Failed to send status message to chat {}: {}", chat_id, e);
                return;
            }
        };

        self.send_action(chat_id, ChatAction::UploadPhoto).await;

        match self.deliver_image(chat_id, &prompt).await {
            Ok(()) => {
                if let Err(e) = self
                    .telegram
                    .delete_message(chat_id, status.message_id)
                    .await
                {
                    tracing::warn!("Failed to delete status message in chat {}: {}", chat_id, e);
                }
            }
            Err(e) => {
                tracing::error!("Image generation failed for chat {}: {:?}", chat_id, e);
                if let Err(e) = self
                    .telegram
                    .edit_message_text(
                        chat_id,
                        status.message_id,
                        IMAGE_FAILURE,
                        Some(ParseMode::Markdown),
                        None,
                    )
                    .await
                {
                    tracing::error!("Failed to report image failure in chat {}: {}", chat_id, e);
                }
            }
        }
    }

    /// Edits a menu message in place. Re-rendering identical content
    /// is not an error.
    async fn edit_menu(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), Error> {
        let parse_mode = markup.map(|_| ParseMode::Markdown);
        match self
            .telegram
            .edit_message_text(chat_id, message_id, text, parse_mode, markup)
            .await
        {
            Err(e) if is_not_modified_error(&e) => Ok(()),
            other => other,
        }
    }

    async fn handle_callback_action(
        &mut self,
        query: &CallbackQuery,
        message: &Message,
    ) -> Result<(), Error> {
        let chat_id = message.chat.id;
        let message_id = message.message_id;
        let action = CallbackAction::parse(query.data.as_deref().unwrap_or_default());

        match action {
            CallbackAction::NewChat => {
                self.store.clear(chat_id).await;
                self.telegram
                    .answer_callback_query(&query.id, Some(RESET_TOAST))
                    .await?;
                self.edit_menu(chat_id, message_id, RESET_DONE, None).await?;
            }
            CallbackAction::SelectModel => {
                let current = self.settings.get(chat_id);
                let text = self.templates.model_list(current)?;
                self.telegram.answer_callback_query(&query.id, None).await?;
                self.edit_menu(chat_id, message_id, &text, Some(&model_keyboard(current)))
                    .await?;
            }
            CallbackAction::Model(model_id) => match self.settings.set(chat_id, &model_id) {
                Ok(profile) => {
                    tracing::info!("Chat {} switched to model {}", chat_id, profile.id);
                    let toast = format!("✅ Model changed to {}", profile.name);
                    self.telegram
                        .answer_callback_query(&query.id, Some(&toast))
                        .await?;
                    let text = self.templates.model_list(profile)?;
                    self.edit_menu(chat_id, message_id, &text, Some(&model_keyboard(profile)))
                        .await?;
                }
                Err(e) => {
                    tracing::warn!("Rejected model selection in chat {}: {}", chat_id, e);
                    self.telegram
                        .answer_callback_query(&query.id, Some(UNKNOWN_MODEL_TOAST))
                        .await?;
                }
            },
            CallbackAction::BackToMenu => {
                let text = self.templates.menu(self.settings.get(chat_id))?;
                self.telegram.answer_callback_query(&query.id, None).await?;
                self.edit_menu(chat_id, message_id, &text, Some(&menu_keyboard()))
                    .await?;
            }
            CallbackAction::Unknown(data) => {
                tracing::debug!("Unknown callback data {} in chat {}", data, chat_id);
                self.telegram.answer_callback_query(&query.id, None).await?;
            }
        }
        Ok(())
    }

    pub(super) async fn handle_callback(&mut self, query: CallbackQuery) {
        let result = match &query.message {
            Some(message) => self.handle_callback_action(&query, message).await,
            None => Err(anyhow!("Callback query {} has no message", query.id)),
        };

        if let Err(e) = result {
            tracing::error!("Error in callback handler: {}", e);
            if let Err(e) = self
                .telegram
                .answer_callback_query(&query.id, Some(CALLBACK_FAILED_TOAST))
                .await
            {
                tracing::error!("Failed to answer callback query {}: {}", query.id, e);
            }
        }
    }
}
