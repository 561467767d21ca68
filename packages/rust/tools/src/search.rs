//! Tiered web search with source prioritization.
//!
//! A query runs against the priority domains first, then the secondary
//! technical domains, then unscoped. Per-domain failures are logged and
//! skipped so a search always produces a report.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use blogcrew_shared::{BlogCrewError, Result, SearchConfig, read_env_key};

use crate::{Tool, ToolError, ToolKind};

/// Official MongoDB news and documentation sources, searched first.
pub const PRIORITY_SOURCES: [&str; 7] = [
    "mongodb.com/blog",
    "www.mongodb.com/docs",
    "www.mongodb.com/developer",
    "www.mongodb.com/community",
    "github.com/mongodb",
    "www.mongodb.com/changelog",
    "engineering.mongodb.com",
];

/// Trusted technical blogs, searched second.
pub const TECH_SOURCES: [&str; 5] = [
    "medium.com/tag/mongodb",
    "dev.to/t/mongodb",
    "dzone.com/mongodb",
    "infoq.com/mongodb",
    "stackoverflow.blog",
];

/// Report text when no tier produced anything.
pub const NO_RESULTS: &str = "No results found.";

const PRIORITY_LIMIT: usize = 3;
const TECH_LIMIT: usize = 2;
const NEWS_LIMIT: usize = 5;
const NEWS_WINDOW_DAYS: u64 = 30;
const RESULTS_PER_QUERY: &str = "5";

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Executes a single search query. An empty string means no hits.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn run(&self, query: &str) -> std::result::Result<String, ToolError>;
}

/// Google Custom Search JSON API backend.
pub struct GoogleSearch {
    client: Client,
    endpoint: String,
    api_key: String,
    engine_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl GoogleSearch {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BlogCrewError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
        })
    }

    /// Read the key and engine id from the env vars named in `[search]`.
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let api_key = read_env_key(&config.api_key_env)?;
        let engine_id = read_env_key(&config.engine_id_env)?;
        Self::new(
            config.endpoint.clone(),
            api_key,
            engine_id,
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl SearchBackend for GoogleSearch {
    async fn run(&self, query: &str) -> std::result::Result<String, ToolError> {
        let fail = |reason: String| ToolError::Search {
            query: query.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", RESULTS_PER_QUERY),
            ])
            .send()
            .await
            // reqwest errors carry the request URL, which holds the API key
            .map_err(|e| fail(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fail(format!("HTTP {status}")));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| fail(format!("invalid response body: {}", e.without_url())))?;

        Ok(body
            .items
            .iter()
            .map(|item| format!("{}\n{}\n{}", item.title, item.link, item.snippet.trim()))
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}

// ---------------------------------------------------------------------------
// Prioritized search
// ---------------------------------------------------------------------------

/// Results of one prioritized search, grouped by tier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchReport {
    pub priority: Vec<String>,
    pub technical: Vec<String>,
    pub general: Option<String>,
}

impl SearchReport {
    pub fn is_empty(&self) -> bool {
        self.priority.is_empty() && self.technical.is_empty() && self.general.is_none()
    }

    /// Model-facing text with one labelled section per non-empty tier.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return NO_RESULTS.to_string();
        }

        let mut sections = Vec::new();
        if !self.priority.is_empty() {
            sections.push(format!("Priority Sources:\n{}", self.priority.join("\n")));
        }
        if !self.technical.is_empty() {
            sections.push(format!("Technical Sources:\n{}", self.technical.join("\n")));
        }
        if let Some(general) = &self.general {
            sections.push(format!("Additional Sources:\n{general}"));
        }
        sections.join("\n\n")
    }
}

/// Search front-end shared by the `Search` and `LatestNews` tools.
pub struct WebSearch {
    backend: Arc<dyn SearchBackend>,
}

impl WebSearch {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// Search priority domains, then technical domains, then the open web.
    #[instrument(skip_all, fields(query = %query))]
    pub async fn search(&self, query: &str) -> SearchReport {
        info!("performing prioritized search");

        let priority = self
            .search_tier(query, &PRIORITY_SOURCES, PRIORITY_LIMIT)
            .await;
        let technical = self.search_tier(query, &TECH_SOURCES, TECH_LIMIT).await;

        let general = match self.backend.run(&format!("{query} mongodb recent")).await {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "general search failed");
                None
            }
        };

        let report = SearchReport {
            priority,
            technical,
            general,
        };
        info!(
            priority = report.priority.len(),
            technical = report.technical.len(),
            general = report.general.is_some(),
            "search completed"
        );
        report
    }

    /// Content from priority domains published in the 30 days before `today`.
    #[instrument(skip_all, fields(today = %today))]
    pub async fn latest_news(&self, today: NaiveDate) -> Vec<String> {
        let since = today
            .checked_sub_days(Days::new(NEWS_WINDOW_DAYS))
            .unwrap_or(today)
            .format("%Y-%m-%d")
            .to_string();

        let mut items = Vec::new();
        for source in PRIORITY_SOURCES {
            if items.len() >= NEWS_LIMIT {
                break;
            }
            match self.backend.run(&format!("after:{since} site:{source}")).await {
                Ok(text) if !text.trim().is_empty() => items.push(text),
                Ok(_) => debug!(source, "no recent news"),
                Err(e) => warn!(source, error = %e, "news search failed"),
            }
        }

        info!(count = items.len(), "gathered recent news");
        items
    }

    async fn search_tier(&self, query: &str, sources: &[&str], limit: usize) -> Vec<String> {
        let mut results = Vec::new();

        for source in sources {
            if results.len() >= limit {
                break;
            }
            match self.backend.run(&format!("{query} site:{source}")).await {
                Ok(text) if !text.trim().is_empty() => {
                    debug!(source, "found results");
                    results.push(text);
                }
                Ok(_) => debug!(source, "no results"),
                Err(e) => warn!(source, error = %e, "source search failed"),
            }
        }

        results
    }
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// The `Search` tool.
pub struct SearchTool {
    web: Arc<WebSearch>,
}

impl SearchTool {
    pub fn new(web: Arc<WebSearch>) -> Self {
        Self { web }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Search
    }

    async fn call(&self, input: &str) -> std::result::Result<String, ToolError> {
        if input.trim().is_empty() {
            return Err(ToolError::InvalidInput {
                tool: ToolKind::Search,
                reason: "query is empty".into(),
            });
        }
        Ok(self.web.search(input.trim()).await.render())
    }
}

/// The `LatestNews` tool.
pub struct LatestNewsTool {
    web: Arc<WebSearch>,
}

impl LatestNewsTool {
    pub fn new(web: Arc<WebSearch>) -> Self {
        Self { web }
    }
}

#[async_trait]
impl Tool for LatestNewsTool {
    fn kind(&self) -> ToolKind {
        ToolKind::LatestNews
    }

    async fn call(&self, _input: &str) -> std::result::Result<String, ToolError> {
        let items = self.web.latest_news(Local::now().date_naive()).await;
        if items.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }
        Ok(format!("Recent MongoDB news:\n\n{}", items.join("\n\n")))
    }
}
