use std::time::Duration;

use anyhow::{Error, Result, anyhow, bail};
use serde::Deserialize;
use serde_json::json;

pub const IMAGE_SIZE: &str = "1024x1024";
pub const IMAGE_QUALITY: &str = "standard";

#[derive(Clone, Debug, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
    #[serde(default)]
    pub revised_prompt: Option<String>,
}

#[derive(Deserialize)]
struct ImagesResponse {
    data: Vec<GeneratedImage>,
}

/// Generates a single image for `prompt` at a fixed size and quality.
pub async fn generate_image(
    prompt: &str,
    api_hostname: &str,
    api_key: &str,
    model: &str,
) -> Result<GeneratedImage, Error> {
    let payload = json!({
        "model": model,
        "prompt": prompt,
        "size": IMAGE_SIZE,
        "quality": IMAGE_QUALITY,
        "n": 1,
    });
    let url = format!("{}/v1/images/generations", api_hostname.trim_end_matches("/"));
    let response = reqwest::Client::new()
        .post(url)
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .timeout(Duration::from_secs(60 * 2))
        .json(&payload)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("Image generation failed with status {}: {}", status, body);
    }

    let resp: ImagesResponse = response.json().await?;
    resp.data
        .into_iter()
        .next()
        .ok_or(anyhow!("Image generation returned no images"))
}
