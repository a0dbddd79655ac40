//! User facing bot messages. The ones with dynamic parts are
//! Handlebars templates rendered without HTML escaping since the
//! output is Telegram Markdown.

use std::fmt;

use anyhow::{Error, Result};
use handlebars::{Handlebars, no_escape};
use serde::Serialize;
use serde_json::json;

use crate::ai::models::{MODELS, ModelProfile};

pub const RESET_DONE: &str = "✅ Conversation history cleared. Starting a new conversation!";
pub const RESET_TOAST: &str = "✅ History cleared!";
pub const CALLBACK_FAILED_TOAST: &str = "❌ An error occurred";
pub const UNKNOWN_MODEL_TOAST: &str = "❌ Unknown model";

pub const TEXT_FAILURE: &str = "⚠️ *Error processing message*\n\nTry:\n• Rephrasing your question\n• Using `/new` to start a new conversation";
pub const PHOTO_FAILURE: &str = "⚠️ *Image analysis failed*\n\nTry:\n• Sending the image again\n• Using `/new` to start a new conversation";

pub const IMAGE_USAGE: &str = "🎨 To generate an image, add a description:\n\nExample: `/image a cat in space`\nOr: `/generate a robot reading a book`";
pub const IMAGE_PENDING: &str = "🎨 *Generating image...*\n\n⏱ This can take ~10 seconds";
pub const IMAGE_FAILURE: &str = "❌ *Image generation failed*\n\nTry changing the description or try again later.";

pub const DEFAULT_PHOTO_PROMPT: &str = "What is in this image?";

const REVISED_PROMPT_PREVIEW: usize = 200;

#[derive(Debug, Clone, Copy)]
pub enum Template {
    Welcome,
    Menu,
    ModelEntry,
    ImageCaption,
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const WELCOME: &str = r"👋 *Hi! I'm a ChatGPT bot*

Current model: *{{model_name}}*

*📋 Commands:*
`/start` or `/help` - show this message
`/menu` - open the settings menu
`/new` - start a new conversation
`/image` - generate an image 🎨

*✨ What I can do:*
📝 Answer text messages
🖼 Analyze images (send a photo)
🎨 Generate images
🔍 Look things up on the web
💬 Keep the context of the conversation

💡 Just send me a message or a photo!";

const MENU: &str = r"⚙️ *Settings*

Current model: *{{model_name}}*

Choose an action:";

const MODEL_LIST_HEADER: &str = "🤖 *Choose a model:*";

const MODEL_ENTRY: &str = "• *{{name}}*\n  Speed: `{{speed}}`\n  {{description}}{{#if active}}\n  ✅ *Active*{{/if}}";

const IMAGE_CAPTION: &str = r"🎨 *Image ready!*

📝 *Your prompt:* {{prompt}}

💡 *Revised prompt:*
{{revised_prompt}}...";

#[derive(Serialize)]
struct ModelEntryData<'a> {
    name: &'a str,
    speed: &'a str,
    description: &'a str,
    active: bool,
}

pub struct Templates(Handlebars<'static>);

impl Templates {
    pub fn new() -> Result<Self, Error> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(no_escape);
        registry.register_template_string(&Template::Welcome.to_string(), WELCOME)?;
        registry.register_template_string(&Template::Menu.to_string(), MENU)?;
        registry.register_template_string(&Template::ModelEntry.to_string(), MODEL_ENTRY)?;
        registry.register_template_string(&Template::ImageCaption.to_string(), IMAGE_CAPTION)?;
        Ok(Self(registry))
    }

    pub fn render<T: Serialize>(&self, template: Template, data: &T) -> Result<String, Error> {
        Ok(self.0.render(&template.to_string(), data)?)
    }

    pub fn welcome(&self, current: &ModelProfile) -> Result<String, Error> {
        self.render(Template::Welcome, &json!({"model_name": current.name}))
    }

    pub fn menu(&self, current: &ModelProfile) -> Result<String, Error> {
        self.render(Template::Menu, &json!({"model_name": current.name}))
    }

    /// Every known model with its speed and description, marking the
    /// active one.
    pub fn model_list(&self, current: &ModelProfile) -> Result<String, Error> {
        let mut sections = vec![MODEL_LIST_HEADER.to_string()];
        for model in MODELS.iter() {
            let data = ModelEntryData {
                name: model.name,
                speed: model.speed,
                description: model.description,
                active: model.id == current.id,
            };
            sections.push(self.render(Template::ModelEntry, &data)?);
        }
        Ok(sections.join("\n\n"))
    }

    /// Caption for a generated image. Only the start of the revised
    /// prompt is shown.
    pub fn image_caption(&self, prompt: &str, revised_prompt: &str) -> Result<String, Error> {
        let preview: String = revised_prompt.chars().take(REVISED_PROMPT_PREVIEW).collect();
        self.render(
            Template::ImageCaption,
            &json!({"prompt": prompt, "revised_prompt": preview}),
        )
    }
}
