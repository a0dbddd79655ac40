//! Parsing of slash commands and inline keyboard callback data
use std::sync::LazyLock;

use regex::Regex;

pub const NEW_CHAT: &str = "new_chat";
pub const SELECT_MODEL: &str = "select_model";
pub const BACK_TO_MENU: &str = "back_to_menu";
pub const MODEL_PREFIX: &str = "model_";

// `/name`, optionally addressed to a bot (`/name@SomeBot`), followed
// by an optional free text argument
static COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^/([A-Za-z0-9_]+)(?:@[A-Za-z0-9_]+)?(?:\s+(.*))?$")
        .expect("Invalid command regex")
});

#[derive(Debug, PartialEq)]
pub enum Command {
    Start,
    Help,
    Menu,
    New,
    /// `/image` or `/generate` with the prompt, if one was given
    Image(Option<String>),
}

impl Command {
    /// Parses a message as a known command. Anything else, including
    /// unknown commands, is ordinary text.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = COMMAND_RE.captures(text.trim())?;
        let arg = caps
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .filter(|a| !a.is_empty());

        match caps[1].to_lowercase().as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "menu" => Some(Command::Menu),
            "new" => Some(Command::New),
            "image" | "generate" => Some(Command::Image(arg)),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum CallbackAction {
    NewChat,
    SelectModel,
    Model(String),
    BackToMenu,
    Unknown(String),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Self {
        match data {
            NEW_CHAT => CallbackAction::NewChat,
            SELECT_MODEL => CallbackAction::SelectModel,
            BACK_TO_MENU => CallbackAction::BackToMenu,
            _ => match data.strip_prefix(MODEL_PREFIX) {
                Some(model_id) => CallbackAction::Model(model_id.to_string()),
                None => CallbackAction::Unknown(data.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/menu"), Some(Command::Menu));
        assert_eq!(Command::parse("/new"), Some(Command::New));
        assert_eq!(Command::parse("/new@ChatRelayBot"), Some(Command::New));
    }

    #[test]
    fn test_parse_image_commands() {
        assert_eq!(
            Command::parse("/image a cat in space"),
            Some(Command::Image(Some("a cat in space".to_string())))
        );
        assert_eq!(
            Command::parse("/generate@ChatRelayBot a robot\nreading a book"),
            Some(Command::Image(Some("a robot\nreading a book".to_string())))
        );
        assert_eq!(Command::parse("/image"), Some(Command::Image(None)));
        assert_eq!(Command::parse("/image    "), Some(Command::Image(None)));
    }

    #[test]
    fn test_not_commands() {
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(Command::parse("/unknown thing"), None);
        assert_eq!(Command::parse("what does /start do?"), None);
        assert_eq!(Command::parse("/imagine"), None);
    }

    #[test]
    fn test_parse_callback_data() {
        assert_eq!(CallbackAction::parse("new_chat"), CallbackAction::NewChat);
        assert_eq!(CallbackAction::parse("select_model"), CallbackAction::SelectModel);
        assert_eq!(CallbackAction::parse("back_to_menu"), CallbackAction::BackToMenu);
        assert_eq!(
            CallbackAction::parse("model_gpt-5"),
            CallbackAction::Model("gpt-5".to_string())
        );
        assert_eq!(
            CallbackAction::parse("something"),
            CallbackAction::Unknown("something".to_string())
        );
    }
}
