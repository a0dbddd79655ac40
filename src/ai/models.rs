//! Known completion models and the per-conversation model preference.
//!
//! Each model carries a capability profile describing how completion
//! requests must be shaped for it, so request building never needs to
//! branch on model names directly.
use std::collections::HashMap;

use anyhow::{Error, Result, anyhow};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Name of the parameter that caps the number of generated tokens.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TokenLimitParam {
    MaxTokens,
    MaxCompletionTokens,
}

impl TokenLimitParam {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenLimitParam::MaxTokens => "max_tokens",
            TokenLimitParam::MaxCompletionTokens => "max_completion_tokens",
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct ModelProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub speed: &'static str,
    pub description: &'static str,
    pub token_limit: TokenLimitParam,
    pub supports_temperature: bool,
    pub supports_tools: bool,
}

pub static MODELS: [ModelProfile; 2] = [
    ModelProfile {
        id: "gpt-4o-mini",
        name: "GPT-4o Mini ⚡",
        speed: "0.75 sec",
        description: "Fast model",
        token_limit: TokenLimitParam::MaxTokens,
        supports_temperature: true,
        supports_tools: true,
    },
    // Reasoning model, counts reasoning tokens against the limit and
    // rejects sampling parameters
    ModelProfile {
        id: "gpt-5",
        name: "GPT-5 🧠",
        speed: "3.80 sec",
        description: "Powerful model",
        token_limit: TokenLimitParam::MaxCompletionTokens,
        supports_temperature: false,
        supports_tools: true,
    },
];

pub fn find_model(id: &str) -> Option<&'static ModelProfile> {
    MODELS.iter().find(|m| m.id == id)
}

/// Per-conversation model preference with a default for
/// conversations that never picked one.
pub trait ModelSettings {
    fn get(&self, chat_id: i64) -> &'static ModelProfile;
    /// Selects a model for the conversation. Unknown model ids are
    /// rejected and the previous selection is kept.
    fn set(&mut self, chat_id: i64, model_id: &str) -> Result<&'static ModelProfile, Error>;
    fn default_model(&self) -> &'static ModelProfile;
}

/// Process-local preferences, lost on restart.
pub struct InMemoryModelSettings {
    default: &'static ModelProfile,
    selections: HashMap<i64, &'static ModelProfile>,
}

impl InMemoryModelSettings {
    /// Falls back to [`DEFAULT_MODEL`] when `default_model` isn't a
    /// known model.
    pub fn new(default_model: &str) -> Self {
        let default = find_model(default_model).unwrap_or_else(|| {
            tracing::warn!(
                "Unknown default model {}, falling back to {}",
                default_model,
                DEFAULT_MODEL
            );
            &MODELS[0]
        });
        Self {
            default,
            selections: HashMap::new(),
        }
    }
}

impl Default for InMemoryModelSettings {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

impl ModelSettings for InMemoryModelSettings {
    fn get(&self, chat_id: i64) -> &'static ModelProfile {
        self.selections.get(&chat_id).copied().unwrap_or(self.default)
    }

    fn set(&mut self, chat_id: i64, model_id: &str) -> Result<&'static ModelProfile, Error> {
        let profile = find_model(model_id).ok_or(anyhow!("Unknown model: {}", model_id))?;
        self.selections.insert(chat_id, profile);
        Ok(profile)
    }

    fn default_model(&self) -> &'static ModelProfile {
        self.default
    }
}
