use anyhow::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::google::custom_search::search_google;
use crate::openai::{Function, Parameters, Property, ToolCall, ToolType};

pub const NOT_CONFIGURED: &str =
    "Google Search is not configured. Set GOOGLE_API_KEY and GOOGLE_CX.";

// Value shipped in the sample env file, never a real engine id
const PLACEHOLDER_CX: &str = "your_search_engine_id_here";
const DEFAULT_NUM_RESULTS: u8 = 5;

#[derive(Serialize)]
pub struct WebSearchProps {
    pub query: Property,
    pub num_results: Property,
}

#[derive(Deserialize)]
pub struct WebSearchArgs {
    pub query: String,
    pub num_results: Option<i64>,
}

#[derive(Serialize)]
pub struct WebSearchTool {
    pub r#type: ToolType,
    pub function: Function<WebSearchProps>,
    #[serde(skip)]
    api_key: Option<String>,
    #[serde(skip)]
    cx_id: Option<String>,
    #[serde(skip)]
    api_hostname: Option<String>,
}

impl WebSearchTool {
    pub fn new(api_key: Option<&str>, cx_id: Option<&str>) -> Self {
        let function = Function {
            name: String::from("google_search"),
            description: String::from(
                "Searches the internet via Google for current, real-time information. Use this function when users ask about weather, news, current events, prices, schedules, recent developments, or any time-sensitive information. Returns search results with titles, snippets, and links.",
            ),
            parameters: Parameters {
                r#type: String::from("object"),
                properties: WebSearchProps {
                    query: Property {
                        r#type: String::from("string"),
                        description: String::from(
                            "Search query in English (translate if needed). Be specific and include relevant keywords like 'current weather Bangkok', 'latest news OpenAI', etc.",
                        ),
                    },
                    num_results: Property {
                        r#type: String::from("integer"),
                        description: String::from("Number of results to return (1-10)."),
                    },
                },
                required: vec![String::from("query")],
                additional_properties: false,
            },
            strict: false,
        };

        Self {
            r#type: ToolType::Function,
            function,
            api_key: api_key.map(String::from),
            cx_id: cx_id.map(String::from),
            api_hostname: None,
        }
    }

    /// Points the tool at a different search endpoint.
    pub fn with_api_hostname(mut self, api_hostname: &str) -> Self {
        self.api_hostname = Some(api_hostname.to_string());
        self
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        let api_key = self.api_key.as_deref()?;
        let cx_id = self.cx_id.as_deref()?;
        if cx_id == PLACEHOLDER_CX {
            return None;
        }
        Some((api_key, cx_id))
    }

    /// Searches and renders the results as text for the model. Never
    /// fails: missing configuration, empty results and request errors
    /// all come back as a descriptive string.
    pub async fn search(&self, query: &str, num_results: Option<i64>) -> String {
        let Some((api_key, cx_id)) = self.credentials() else {
            return NOT_CONFIGURED.to_string();
        };
        let num = num_results
            .unwrap_or(DEFAULT_NUM_RESULTS as i64)
            .clamp(1, 10) as u8;

        let items = match search_google(
            query,
            api_key,
            cx_id,
            Some(num),
            self.api_hostname.as_deref(),
        )
        .await
        {
            Ok(items) => items,
            Err(e) => {
                tracing::error!("Google Search error: {}", e);
                return format!("Search error: {}", e);
            }
        };

        if items.is_empty() {
            return format!("No results found for query: {}", query);
        }

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let title = if item.title.is_empty() {
                    "Untitled"
                } else {
                    item.title.as_str()
                };
                format!("{}. **{}**\n{}\n{}", i + 1, title, item.snippet, item.link)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[async_trait]
impl ToolCall for WebSearchTool {
    async fn call(&self, args: &str) -> Result<String, Error> {
        let fn_args: WebSearchArgs = serde_json::from_str(args)?;
        Ok(self.search(&fn_args.query, fn_args.num_results).await)
    }

    fn function_name(&self) -> String {
        self.function.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_tool_definition() {
        let tool = WebSearchTool::new(None, None);
        let value = serde_json::to_value(&tool).unwrap();
        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["name"], "google_search");
        assert_eq!(value["function"]["parameters"]["required"][0], "query");
        assert_eq!(
            value["function"]["parameters"]["properties"]["num_results"]["type"],
            "integer"
        );
        // Credentials never end up in the request payload
        assert!(value.get("api_key").is_none());
        assert!(value.get("cx_id").is_none());
    }

    #[tokio::test]
    async fn test_not_configured() {
        let tool = WebSearchTool::new(None, None);
        let result = tool.call(r#"{"query":"weather"}"#).await.unwrap();
        assert_eq!(result, NOT_CONFIGURED);

        let tool = WebSearchTool::new(Some("key"), None);
        assert_eq!(tool.search("weather", None).await, NOT_CONFIGURED);

        let tool = WebSearchTool::new(Some("key"), Some("your_search_engine_id_here"));
        assert_eq!(tool.search("weather", None).await, NOT_CONFIGURED);
    }

    #[tokio::test]
    async fn test_formats_results() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "weather bangkok".into()),
                Matcher::UrlEncoded("num".into(), "5".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"items":[
                    {"title":"Bangkok Weather","link":"https://weather.example.com","snippet":"Sunny, 34C"},
                    {"link":"https://other.example.com","snippet":"Humid"}
                ]}"#,
            )
            .create_async()
            .await;

        let tool = WebSearchTool::new(Some("key"), Some("cx")).with_api_hostname(&server.url());
        let result = tool.call(r#"{"query":"weather bangkok"}"#).await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            result,
            "1. **Bangkok Weather**\nSunny, 34C\nhttps://weather.example.com\n\n2. **Untitled**\nHumid\nhttps://other.example.com"
        );
    }

    #[tokio::test]
    async fn test_clamps_num_results() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::UrlEncoded("num".into(), "10".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{}"#)
            .create_async()
            .await;

        let tool = WebSearchTool::new(Some("key"), Some("cx")).with_api_hostname(&server.url());
        let result = tool
            .call(r#"{"query":"news","num_results":50}"#)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result, "No results found for query: news");
    }

    #[tokio::test]
    async fn test_search_error_is_rendered() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let tool = WebSearchTool::new(Some("key"), Some("cx")).with_api_hostname(&server.url());
        let result = tool.call(r#"{"query":"news"}"#).await.unwrap();
        assert!(result.starts_with("Search error:"));
    }

    #[tokio::test]
    async fn test_invalid_args() {
        let tool = WebSearchTool::new(Some("key"), Some("cx"));
        assert!(tool.call("not json").await.is_err());
    }
}
