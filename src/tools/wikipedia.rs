//! Wikipedia toolkit.
//!
//! Retrieves article summaries from the Wikipedia REST API.

use async_trait::async_trait;
use serde_json::Value;

use crate::tool::Tool;

pub const DEFAULT_WIKIPEDIA_BASE_URL: &str = "https://en.wikipedia.org";

pub struct WikipediaSearchTool {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug)]
struct WikipediaSummary {
    title: String,
    extract: String,
}

impl WikipediaSearchTool {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_summary(&self, title: &str) -> Result<WikipediaSummary, reqwest::Error> {
        // Article titles use underscores in place of spaces.
        let slug = title.trim().replace(' ', "_");
        let url = format!(
            "{}/api/rest_v1/page/summary/{}",
            self.base_url,
            urlencoding::encode(&slug)
        );

        let json: Value = self
            .http
            .get(&url)
            .header("User-Agent", "ReactAgent/0.1 (https://github.com/react-agent)")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let title = json["title"].as_str().unwrap_or("N/A").to_string();
        let extract = json["extract"]
            .as_str()
            .unwrap_or("No summary available")
            .to_string();

        Ok(WikipediaSummary { title, extract })
    }
}

#[async_trait]
impl Tool for WikipediaSearchTool {
    fn name(&self) -> &str {
        "wikipedia_search"
    }

    fn description(&self) -> &str {
        "Search Wikipedia. Input: article title as string"
    }

    async fn call(&self, input: Option<&str>) -> String {
        let title = input.unwrap_or_default();
        match self.fetch_summary(title).await {
            Ok(summary) => format!("Title: {}\n\nSummary: {}", summary.title, summary.extract),
            Err(err) => {
                tracing::warn!(title, error = %err, "wikipedia lookup failed");
                format!("Error searching Wikipedia: {err}")
            }
        }
    }
}
