//! Subset of the Telegram Bot API types the bot reads and sends
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub photo: Option<Vec<PhotoSize>>,
}

impl Message {
    /// The highest resolution variant of an attached photo.
    pub fn largest_photo(&self) -> Option<&PhotoSize> {
        self.photo
            .as_ref()?
            .iter()
            .max_by_key(|p| u64::from(p.width) * u64::from(p.height))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub data: Option<String>,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct File {
    pub file_id: String,
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineKeyboardButton {
    pub fn new(text: &str, callback_data: &str) -> Self {
        Self {
            text: text.to_string(),
            callback_data: callback_data.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    /// One button per row.
    pub fn single_column(buttons: Vec<InlineKeyboardButton>) -> Self {
        Self {
            inline_keyboard: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ParseMode {
    Markdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatAction {
    Typing,
    UploadPhoto,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_with_text_message() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 10,
            "message": {
                "message_id": 5,
                "date": 1700000000,
                "chat": {"id": 42, "type": "private"},
                "from": {"id": 42, "is_bot": false, "first_name": "Sam"},
                "text": "Hello"
            }
        }))
        .unwrap();
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 42);
        assert_eq!(message.text.as_deref(), Some("Hello"));
        assert!(update.callback_query.is_none());
    }

    #[test]
    fn test_largest_photo() {
        let message: Message = serde_json::from_value(json!({
            "message_id": 1,
            "chat": {"id": 1},
            "photo": [
                {"file_id": "small", "file_unique_id": "a", "width": 90, "height": 60},
                {"file_id": "large", "file_unique_id": "c", "width": 1280, "height": 853},
                {"file_id": "medium", "file_unique_id": "b", "width": 320, "height": 213}
            ]
        }))
        .unwrap();
        assert_eq!(message.largest_photo().unwrap().file_id, "large");

        let no_photo: Message =
            serde_json::from_value(json!({"message_id": 1, "chat": {"id": 1}})).unwrap();
        assert!(no_photo.largest_photo().is_none());
    }

    #[test]
    fn test_keyboard_serialization() {
        let markup = InlineKeyboardMarkup::single_column(vec![
            InlineKeyboardButton::new("New", "new_chat"),
            InlineKeyboardButton::new("Model", "select_model"),
        ]);
        assert_eq!(
            serde_json::to_value(&markup).unwrap(),
            json!({"inline_keyboard": [
                [{"text": "New", "callback_data": "new_chat"}],
                [{"text": "Model", "callback_data": "select_model"}]
            ]})
        );
    }

    #[test]
    fn test_enum_serialization() {
        assert_eq!(serde_json::to_string(&ParseMode::Markdown).unwrap(), r#""Markdown""#);
        assert_eq!(serde_json::to_string(&ChatAction::Typing).unwrap(), r#""typing""#);
        assert_eq!(
            serde_json::to_string(&ChatAction::UploadPhoto).unwrap(),
            r#""upload_photo""#
        );
    }
}
