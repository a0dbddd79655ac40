use serde_json::{Value, json};

use super::models::ModelProfile;
use crate::openai::{BoxedToolCall, Message};

#[derive(Clone, Copy, Debug)]
pub struct CompletionOptions {
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            max_tokens: 4000,
            temperature: None,
        }
    }
}

/// Builds the completion request payload for a model. Tools are only
/// attached when given and the model supports them.
pub fn build_completion_payload(
    profile: &ModelProfile,
    messages: &[Message],
    tools: Option<&[BoxedToolCall]>,
    options: &CompletionOptions,
) -> Value {
    let mut payload = json!({
        "model": profile.id,
        "messages": messages,
    });
    payload[profile.token_limit.as_str()] = json!(options.max_tokens);

    if let Some(temperature) = options.temperature {
        if profile.supports_temperature {
            payload["temperature"] = json!(temperature);
        }
    }

    if let Some(tools) = tools {
        if profile.supports_tools && !tools.is_empty() {
            payload["tools"] = json!(tools);
            payload["tool_choice"] = json!("auto");
        }
    }

    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::models::find_model;
    use crate::openai::{Role, ToolCall};
    use anyhow::Result;

    #[derive(serde::Serialize)]
    struct MockTool {
        r#type: String,
        name: String,
    }

    #[async_trait::async_trait]
    impl ToolCall for MockTool {
        async fn call(&self, _args: &str) -> Result<String> {
            Ok("mock result".to_string())
        }
        fn function_name(&self) -> String {
            self.name.clone()
        }
    }

    fn mock_tools() -> Vec<BoxedToolCall> {
        vec![Box::new(MockTool {
            r#type: "function".to_string(),
            name: "google_search".to_string(),
        })]
    }

    fn options() -> CompletionOptions {
        CompletionOptions {
            max_tokens: 4000,
            temperature: Some(0.7),
        }
    }

    #[test]
    fn test_standard_model_payload() {
        let profile = find_model("gpt-4o-mini").unwrap();
        let messages = vec![Message::new(Role::User, "Hi")];
        let tools = mock_tools();
        let payload = build_completion_payload(profile, &messages, Some(&tools), &options());

        assert_eq!(payload["model"], "gpt-4o-mini");
        assert_eq!(payload["max_tokens"], 4000);
        assert!(payload.get("max_completion_tokens").is_none());
        assert!((payload["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(payload["tools"][0]["name"], "google_search");
        assert_eq!(payload["tool_choice"], "auto");
        assert_eq!(payload["messages"][0]["content"], "Hi");
    }

    #[test]
    fn test_reasoning_model_payload() {
        let profile = find_model("gpt-5").unwrap();
        let messages = vec![Message::new(Role::User, "Hi")];
        let tools = mock_tools();
        let payload = build_completion_payload(profile, &messages, Some(&tools), &options());

        assert_eq!(payload["model"], "gpt-5");
        assert_eq!(payload["max_completion_tokens"], 4000);
        assert!(payload.get("max_tokens").is_none());
        assert!(payload.get("temperature").is_none());
        assert_eq!(payload["tool_choice"], "auto");
    }

    #[test]
    fn test_suppressed_tools() {
        let profile = find_model("gpt-4o-mini").unwrap();
        let messages = vec![Message::new(Role::User, "Hi")];
        let payload = build_completion_payload(profile, &messages, None, &options());

        assert!(payload.get("tools").is_none());
        assert!(payload.get("tool_choice").is_none());
    }

    #[test]
    fn test_no_temperature_configured() {
        let profile = find_model("gpt-4o-mini").unwrap();
        let payload =
            build_completion_payload(profile, &[], None, &CompletionOptions::default());
        assert!(payload.get("temperature").is_none());
        assert_eq!(payload["max_tokens"], 4000);
    }
}
