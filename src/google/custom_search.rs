//! Google Custom Search JSON API client
use std::time::Duration;

use anyhow::{Error, Result};
use reqwest::Client;
use serde::Deserialize;

pub const GOOGLE_SEARCH_API_HOSTNAME: &str = "https://www.googleapis.com";

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    // Missing entirely when there are no results
    items: Option<Vec<SearchItem>>,
}

/// Runs a search and returns at most `num` items (the API caps this
/// at 10). `api_hostname` overrides the Google endpoint.
pub async fn search_google(
    query: &str,
    api_key: &str,
    cx_id: &str,
    num: Option<u8>,
    api_hostname: Option<&str>,
) -> Result<Vec<SearchItem>, Error> {
    let num = num.unwrap_or(10).clamp(1, 10);
    let url = format!(
        "{}/customsearch/v1",
        api_hostname
            .unwrap_or(GOOGLE_SEARCH_API_HOSTNAME)
            .trim_end_matches("/")
    );

    let num_param = num.to_string();
    let resp: SearchResponse = Client::new()
        .get(url)
        .query(&[
            ("key", api_key),
            ("cx", cx_id),
            ("q", query),
            ("num", num_param.as_str()),
        ])
        .timeout(Duration::from_secs(10))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let mut items = resp.items.unwrap_or_default();
    items.truncate(num as usize);
    Ok(items)
}
