//! The core models for managing a stateful chat with an LLM.
use serde::{Deserialize, Serialize};

use crate::openai::{Message, Role};

/// Ordered turn history for one conversation. Turns are only ever
/// appended.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript(Vec<Message>);

impl Transcript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// A fresh transcript holding only the system turn.
    pub fn new_with_system(system_message: &str) -> Self {
        Self(vec![Message::new(Role::System, system_message)])
    }

    pub fn new_with_messages(messages: Vec<Message>) -> Self {
        Self(messages)
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn push(&mut self, msg: Message) {
        self.0.push(msg)
    }

    pub fn append(mut self, msg: Message) -> Self {
        self.0.push(msg);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.0.last()
    }

    /// Whether the first turn is the system turn.
    pub fn starts_with_system(&self) -> bool {
        self.0.first().is_some_and(|m| *m.role() == Role::System)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_system() {
        let transcript = Transcript::new_with_system("You are a helpful assistant.");
        assert_eq!(transcript.len(), 1);
        assert!(transcript.starts_with_system());
    }

    #[test]
    fn test_append_keeps_order() {
        let transcript = Transcript::new_with_system("system")
            .append(Message::new(Role::User, "one"))
            .append(Message::new(Role::Assistant, "two"));
        let texts: Vec<_> = transcript.iter().filter_map(|m| m.text()).collect();
        assert_eq!(texts, vec!["system", "one", "two"]);
    }

    #[test]
    fn test_serializes_as_list() {
        let transcript = Transcript::new_with_system("system");
        assert_eq!(
            serde_json::to_string(&transcript).unwrap(),
            r#"[{"role":"system","content":"system"}]"#
        );
    }

    #[test]
    fn test_without_system_turn() {
        let transcript = Transcript::new_with_messages(vec![Message::new(Role::User, "hi")]);
        assert!(!transcript.starts_with_system());
        assert!(!Transcript::new().starts_with_system());
    }
}
