use anyhow::Result;

use crate::ai::models::find_model;
use crate::core::AppConfig;
use crate::openai::list_models;

pub async fn run(config: AppConfig) -> Result<()> {
    let ids = list_models(&config.openai_api_hostname, &config.openai_api_key).await?;

    for id in ids.iter().filter(|id| id.contains("gpt")) {
        let marker = if find_model(id).is_some() { " (supported)" } else { "" };
        println!("{}{}", id, marker);
    }

    Ok(())
}
