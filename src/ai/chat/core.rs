use anyhow::{Error, Result};
use futures_util::future::join_all;

use super::models::Transcript;
use crate::ai::models::ModelProfile;
use crate::ai::request::{CompletionOptions, build_completion_payload};
use crate::openai::{BoxedToolCall, FunctionCall, Message, Role, completion};

/// Shown and stored in place of an empty answer from the model.
pub const EMPTY_ANSWER_APOLOGY: &str =
    "Sorry, I couldn't generate a response. Please try again.";

/// One conversation turn against an OpenAI compatible completion API.
///
/// Tool calls are resolved at most once per user message: when the
/// first response asks for tools, their results are sent back with
/// tool calling disabled and that second response is the answer,
/// whatever it contains.
///
/// Use `Chat::builder()` to construct a valid `Chat`.
pub struct Chat<'a> {
    api_hostname: String,
    api_key: String,
    profile: &'static ModelProfile,
    options: CompletionOptions,
    tools: Option<&'a [BoxedToolCall]>,
    transcript: Transcript,
}

impl<'a> Chat<'a> {
    pub fn builder(
        api_hostname: &str,
        api_key: &str,
        profile: &'static ModelProfile,
    ) -> ChatBuilder<'a> {
        ChatBuilder::new(api_hostname, api_key, profile)
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    async fn handle_tool_call(tools: &[BoxedToolCall], tool_call: &FunctionCall) -> String {
        let name = &tool_call.function.name;
        let args = &tool_call.function.arguments;
        tracing::debug!("\nTool call: {}\nargs: {}", name, args);

        let Some(tool) = tools.iter().find(|t| t.function_name() == *name) else {
            tracing::warn!("Received tool call that doesn't exist: {}", name);
            return format!("Unknown function: {}", name);
        };

        match tool.call(args).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Tool call {} failed: {}", name, e);
                format!("Tool {} failed: {}", name, e)
            }
        }
    }

    async fn handle_tool_calls(
        tools: &[BoxedToolCall],
        tool_calls: &[FunctionCall],
    ) -> Vec<Message> {
        // Run each tool call concurrently, results come back in the
        // same order as the calls
        let futures = tool_calls
            .iter()
            .map(|call| Self::handle_tool_call(tools, call));
        let results = join_all(futures).await;

        tool_calls
            .iter()
            .zip(results)
            .map(|(call, result)| Message::new_tool_call_response(&result, &call.id))
            .collect()
    }

    /// Runs the next turn in chat by appending `msg` to the transcript
    /// and asking the LLM for a response. Returns the messages added
    /// after `msg`: the final answer, preceded by the tool call request
    /// and tool results when tools were used.
    pub async fn next_msg(&mut self, msg: Message) -> Result<Vec<Message>, Error> {
        self.transcript.push(msg);
        let mut messages = Vec::new();

        let payload = build_completion_payload(
            self.profile,
            self.transcript.messages(),
            self.tools,
            &self.options,
        );
        let resp = completion(&payload, &self.api_hostname, &self.api_key).await?;
        let resp_msg = resp.message()?;

        let answer = match resp_msg.tool_calls.as_deref() {
            Some(tool_calls) if !tool_calls.is_empty() => {
                tracing::debug!("Tool calls requested: {}", tool_calls.len());
                let request =
                    Message::new_tool_call_request(resp_msg.content.as_deref(), tool_calls.to_vec());
                self.transcript.push(request.clone());
                messages.push(request);

                let results =
                    Self::handle_tool_calls(self.tools.unwrap_or_default(), tool_calls).await;
                for m in results {
                    self.transcript.push(m.clone());
                    messages.push(m);
                }

                // Provide the tool results back without offering tools
                // again so the model has to answer
                let payload = build_completion_payload(
                    self.profile,
                    self.transcript.messages(),
                    None,
                    &self.options,
                );
                let resp = completion(&payload, &self.api_hostname, &self.api_key).await?;
                let final_msg = resp.message()?;
                if final_msg.tool_calls.as_ref().is_some_and(|c| !c.is_empty()) {
                    tracing::warn!("Ignoring tool calls requested after tool results");
                }
                final_msg.content.clone()
            }
            _ => resp_msg.content.clone(),
        };

        let answer = match answer {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                tracing::error!("Empty response from model {}", self.profile.id);
                EMPTY_ANSWER_APOLOGY.to_string()
            }
        };

        let final_msg = Message::new(Role::Assistant, &answer);
        self.transcript.push(final_msg.clone());
        messages.push(final_msg);

        Ok(messages)
    }
}

pub struct ChatBuilder<'a> {
    api_hostname: String,
    api_key: String,
    profile: &'static ModelProfile,
    options: CompletionOptions,
    tools: Option<&'a [BoxedToolCall]>,
    transcript: Transcript,
}

impl<'a> ChatBuilder<'a> {
    pub fn new(api_hostname: &str, api_key: &str, profile: &'static ModelProfile) -> Self {
        Self {
            api_hostname: api_hostname.to_string(),
            api_key: api_key.to_string(),
            profile,
            options: CompletionOptions::default(),
            tools: None,
            transcript: Transcript::new(),
        }
    }

    pub fn build(self) -> Chat<'a> {
        Chat {
            api_hostname: self.api_hostname,
            api_key: self.api_key,
            profile: self.profile,
            options: self.options,
            tools: self.tools,
            transcript: self.transcript,
        }
    }

    pub fn transcript(mut self, transcript: Transcript) -> Self {
        self.transcript = transcript;
        self
    }

    pub fn options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn tools(mut self, tools: &'a [BoxedToolCall]) -> Self {
        self.tools = Some(tools);
        self
    }
}
