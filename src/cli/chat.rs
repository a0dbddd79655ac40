use anyhow::{Result, anyhow};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::ai::chat::Chat;
use crate::ai::models::{InMemoryModelSettings, ModelSettings};
use crate::ai::request::CompletionOptions;
use crate::ai::tools::WebSearchTool;
use crate::chat::ConversationStore;
use crate::core::AppConfig;
use crate::openai::{BoxedToolCall, Message, Role};

pub async fn run(config: AppConfig, chat_id: i64) -> Result<()> {
    let mut rl = DefaultEditor::new().map_err(|e| anyhow!("Editor failed: {}", e))?;

    let tools: Vec<BoxedToolCall> = vec![Box::new(WebSearchTool::new(
        config.google_search_api_key.as_deref(),
        config.google_search_cx_id.as_deref(),
    ))];
    let store = ConversationStore::new(config.history_path(), &config.system_message);
    let profile = InMemoryModelSettings::new(&config.default_model).get(chat_id);
    let options = CompletionOptions {
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    };

    println!("Chatting with {} in conversation {}. /new clears history.", profile.name, chat_id);

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "/new" {
                    store.clear(chat_id).await;
                    println!("History cleared");
                    continue;
                }
                let _ = rl.add_history_entry(line);

                let mut chat = Chat::builder(
                    &config.openai_api_hostname,
                    &config.openai_api_key,
                    profile,
                )
                .transcript(store.load(chat_id).await)
                .tools(&tools)
                .options(options)
                .build();

                match chat.next_msg(Message::new(Role::User, line)).await {
                    Ok(messages) => {
                        store.save(chat_id, chat.transcript()).await;
                        if let Some(text) = messages.last().and_then(|m| m.text()) {
                            println!("{}", text);
                        }
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
