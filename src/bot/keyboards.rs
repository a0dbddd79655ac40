use crate::ai::models::{MODELS, ModelProfile};
use crate::telegram::{InlineKeyboardButton, InlineKeyboardMarkup};

use super::commands::{BACK_TO_MENU, MODEL_PREFIX, NEW_CHAT, SELECT_MODEL};

pub fn menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::single_column(vec![
        InlineKeyboardButton::new("🔄 Start a new conversation", NEW_CHAT),
        InlineKeyboardButton::new("🤖 Select model", SELECT_MODEL),
    ])
}

/// One button per known model, the active one checked, then a back
/// button.
pub fn model_keyboard(current: &ModelProfile) -> InlineKeyboardMarkup {
    let mut buttons: Vec<InlineKeyboardButton> = MODELS
        .iter()
        .map(|model| {
            let checkmark = if model.id == current.id { "✅ " } else { "" };
            InlineKeyboardButton::new(
                &format!("{}{} - {}", checkmark, model.name, model.speed),
                &format!("{}{}", MODEL_PREFIX, model.id),
            )
        })
        .collect();
    buttons.push(InlineKeyboardButton::new("⬅️ Back", BACK_TO_MENU));
    InlineKeyboardMarkup::single_column(buttons)
}
