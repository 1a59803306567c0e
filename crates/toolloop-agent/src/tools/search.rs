//! Web search tool backed by the Serper API.
//!
//! Returns only the first organic result, rendered as
//! `Title: …\nLink: …\nSnippet: …`.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use toolloop_core::config::schema::DEFAULT_SEARCH_API_BASE;

use super::base::{require_string, Tool};
use crate::error::ToolError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ─────────────────────────────────────────────
// Result type
// ─────────────────────────────────────────────

/// The first organic hit of a search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Title: {}\nLink: {}\nSnippet: {}",
            self.title, self.link, self.snippet
        )
    }
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
}

impl From<OrganicResult> for SearchResult {
    fn from(r: OrganicResult) -> Self {
        SearchResult {
            title: r.title.unwrap_or_else(|| "No title".to_string()),
            link: r.link.unwrap_or_else(|| "No link".to_string()),
            snippet: r
                .snippet
                .unwrap_or_else(|| "No snippet available.".to_string()),
        }
    }
}

// ─────────────────────────────────────────────
// SearchTool
// ─────────────────────────────────────────────

/// Searches the web using the Serper API.
pub struct SearchTool {
    api_key: Option<String>,
    api_base: String,
    client: Client,
}

impl SearchTool {
    /// Create a new search tool.
    ///
    /// `api_key` can be `None`; it will fall back to `SERPER_API_KEY` env var.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()),
            api_base: DEFAULT_SEARCH_API_BASE.to_string(),
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Point the tool at a different endpoint (proxies, tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("SERPER_API_KEY").ok())
    }

    /// Run a query and return the first organic result.
    pub async fn search(&self, query: &str) -> anyhow::Result<SearchResult> {
        let api_key = self.resolve_api_key().ok_or_else(|| {
            anyhow::anyhow!("No Serper API key configured (set SERPER_API_KEY env var)")
        })?;

        debug!(query = %query, "searching web");

        let resp = self
            .client
            .post(&self.api_base)
            .header("X-API-KEY", api_key)
            .json(&json!({ "q": query }))
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Serper request failed: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!(status = %status, "search request rejected");
            anyhow::bail!("Serper API returned {status}: {body}");
        }

        let body: SerperResponse = resp
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse Serper response: {e}"))?;

        body.organic
            .into_iter()
            .next()
            .map(SearchResult::from)
            .ok_or_else(|| ToolError::NoSearchResults.into())
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search the web for real-time information. Returns the title, link and snippet of the top result."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search term to look up"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let query = require_string(&params, "query")?;
        Ok(self.search(&query).await?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn params(query: &str) -> HashMap<String, Value> {
        let mut p = HashMap::new();
        p.insert("query".to_string(), json!(query));
        p
    }

    #[test]
    fn test_search_result_display() {
        let result = SearchResult {
            title: "iPhone 16".into(),
            link: "https://apple.com".into(),
            snippet: "Announced September 9, 2024.".into(),
        };
        assert_eq!(
            result.to_string(),
            "Title: iPhone 16\nLink: https://apple.com\nSnippet: Announced September 9, 2024."
        );
    }

    #[tokio::test]
    async fn test_search_first_organic_result() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("X-API-KEY", "serper-test"))
            .and(body_json(json!({ "q": "latest iPhone" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organic": [
                    { "title": "iPhone 16 Pro", "link": "https://apple.com/iphone", "snippet": "The newest model." },
                    { "title": "Second", "link": "https://example.com", "snippet": "ignored" }
                ]
            })))
            .mount(&server)
            .await;

        let tool = SearchTool::new(Some("serper-test".into())).with_api_base(server.uri());
        let out = tool.execute(params("latest iPhone")).await.unwrap();
        assert_eq!(
            out,
            "Title: iPhone 16 Pro\nLink: https://apple.com/iphone\nSnippet: The newest model."
        );
    }

    #[tokio::test]
    async fn test_search_missing_fields_use_fallbacks() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "organic": [ { "link": "https://a.example" } ] })),
            )
            .mount(&server)
            .await;

        let tool = SearchTool::new(Some("k".into())).with_api_base(server.uri());
        let result = tool.search("anything").await.unwrap();
        assert_eq!(result.title, "No title");
        assert_eq!(result.link, "https://a.example");
        assert_eq!(result.snippet, "No snippet available.");
    }

    #[tokio::test]
    async fn test_search_no_results() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "organic": [] })))
            .mount(&server)
            .await;

        let tool = SearchTool::new(Some("k".into())).with_api_base(server.uri());
        let err = tool.search("nothing").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ToolError>(),
            Some(ToolError::NoSearchResults)
        ));
    }

    #[tokio::test]
    async fn test_search_http_error_propagates() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("bad key"))
            .mount(&server)
            .await;

        let tool = SearchTool::new(Some("wrong".into())).with_api_base(server.uri());
        let err = tool.execute(params("x")).await.unwrap_err();
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn test_search_missing_query() {
        let tool = SearchTool::new(Some("k".into()));
        let err = tool.execute(HashMap::new()).await.unwrap_err();
        assert!(err.to_string().contains("query"));
    }
}
