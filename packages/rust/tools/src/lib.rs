//! Web tools the agents can call: prioritized search, recent-news lookup and
//! page scraping.
//!
//! This crate provides:
//! - [`search`]: tiered web search over a pluggable [`SearchBackend`]
//! - [`scrape`]: main-content text extraction from a single page
//! - [`ToolRegistry`]: resolves a tool name from the model and renders the
//!   model-facing reply

pub mod scrape;
pub mod search;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, warn};

use blogcrew_shared::{AppConfig, Result};

pub use scrape::{MAX_SCRAPE_CHARS, PageScraper, ScrapeTool, ScrapedPage, extract_main_text};
pub use search::{
    GoogleSearch, LatestNewsTool, NO_RESULTS, PRIORITY_SOURCES, SearchBackend, SearchReport,
    SearchTool, TECH_SOURCES, WebSearch,
};

// ---------------------------------------------------------------------------
// Tool kinds
// ---------------------------------------------------------------------------

/// The tools an agent may be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Search,
    ScrapeWeb,
    LatestNews,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [ToolKind::Search, ToolKind::ScrapeWeb, ToolKind::LatestNews];

    /// Function name declared to the model.
    pub fn name(self) -> &'static str {
        match self {
            Self::Search => "Search",
            Self::ScrapeWeb => "ScrapeWeb",
            Self::LatestNews => "LatestNews",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Search => {
                "Advanced search tool for MongoDB information. Prioritizes official documentation, \
                 MongoDB blog posts, and trusted technical sources. Use specific queries for best results."
            }
            Self::ScrapeWeb => {
                "Web scraping tool optimized for MongoDB documentation and technical articles. \
                 Input should be a valid URL. Returns cleaned and formatted content with source attribution."
            }
            Self::LatestNews => {
                "Gathers MongoDB news and announcements published on official sources in the last 30 days."
            }
        }
    }

    /// Argument field carrying the tool's input, if it takes one.
    fn input_field(self) -> Option<&'static str> {
        match self {
            Self::Search => Some("query"),
            Self::ScrapeWeb => Some("url"),
            Self::LatestNews => None,
        }
    }

    /// JSON schema of the function parameters.
    pub fn parameters(self) -> Value {
        match self {
            Self::Search => json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search query" }
                },
                "required": ["query"]
            }),
            Self::ScrapeWeb => json!({
                "type": "object",
                "properties": {
                    "url": { "type": "string", "description": "Absolute http(s) URL of the page" }
                },
                "required": ["url"]
            }),
            Self::LatestNews => json!({
                "type": "object",
                "properties": {}
            }),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure inside a tool. Rendered to text only when handed back to a model.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Error scraping {url}: {reason}")]
    Scrape { url: String, reason: String },

    #[error("search failed for '{query}': {reason}")]
    Search { query: String, reason: String },

    #[error("invalid arguments for {tool}: {reason}")]
    InvalidInput { tool: ToolKind, reason: String },

    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

// ---------------------------------------------------------------------------
// Tool trait + registry
// ---------------------------------------------------------------------------

/// A callable tool. `input` is the single string argument (query, URL, or
/// empty for tools without input).
#[async_trait]
pub trait Tool: Send + Sync {
    fn kind(&self) -> ToolKind;

    async fn call(&self, input: &str) -> std::result::Result<String, ToolError>;
}

/// Live tools available to a run.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Box<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Build every tool from config: Google search backend plus scraper.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let backend = GoogleSearch::from_config(&config.search)?;
        let web = Arc::new(WebSearch::new(Arc::new(backend)));
        let scraper = PageScraper::new()?;

        Ok(Self::new(vec![
            Box::new(SearchTool::new(Arc::clone(&web))),
            Box::new(LatestNewsTool::new(web)),
            Box::new(ScrapeTool::new(scraper)),
        ]))
    }

    pub fn get(&self, kind: ToolKind) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.kind() == kind)
            .map(|t| t.as_ref())
    }

    pub fn kinds(&self) -> Vec<ToolKind> {
        self.tools.iter().map(|t| t.kind()).collect()
    }

    /// Run a tool call from the model and return the text to feed back.
    ///
    /// `arguments` is the model's JSON argument object; a bare string is
    /// accepted as the input itself. Errors are rendered as text here and
    /// nowhere else.
    pub async fn invoke(&self, name: &str, arguments: &str) -> String {
        match self.try_invoke(name, arguments).await {
            Ok(output) => output,
            Err(e) => {
                warn!(tool = name, error = %e, "tool call failed");
                truncate_chars(&e.to_string(), MAX_SCRAPE_CHARS)
            }
        }
    }

    async fn try_invoke(&self, name: &str, arguments: &str) -> std::result::Result<String, ToolError> {
        let kind = ToolKind::from_name(name).ok_or_else(|| ToolError::UnknownTool(name.into()))?;
        let tool = self
            .get(kind)
            .ok_or_else(|| ToolError::UnknownTool(name.into()))?;
        let input = parse_input(kind, arguments)?;

        debug!(tool = name, input_len = input.len(), "invoking tool");
        tool.call(&input).await
    }
}

/// Pull the single input string out of a tool-call argument payload.
fn parse_input(kind: ToolKind, arguments: &str) -> std::result::Result<String, ToolError> {
    let trimmed = arguments.trim();
    let Some(field) = kind.input_field() else {
        return Ok(String::new());
    };

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => match map.get(field) {
            Some(Value::String(s)) => Ok(s.trim().to_string()),
            Some(other) => Ok(other.to_string()),
            None => Err(ToolError::InvalidInput {
                tool: kind,
                reason: format!("missing '{field}' argument"),
            }),
        },
        Ok(Value::String(s)) => Ok(s.trim().to_string()),
        _ if trimmed.is_empty() => Err(ToolError::InvalidInput {
            tool: kind,
            reason: format!("missing '{field}' argument"),
        }),
        _ => Ok(trimmed.to_string()),
    }
}

/// Keep at most `max` characters, never splitting a UTF-8 sequence.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo(ToolKind);

    #[async_trait]
    impl Tool for Echo {
        fn kind(&self) -> ToolKind {
            self.0
        }

        async fn call(&self, input: &str) -> std::result::Result<String, ToolError> {
            if input == "fail" {
                return Err(ToolError::Scrape {
                    url: "https://example.com/x".into(),
                    reason: "HTTP 500".into(),
                });
            }
            Ok(format!("{}:{input}", self.0))
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new(vec![
            Box::new(Echo(ToolKind::Search)),
            Box::new(Echo(ToolKind::ScrapeWeb)),
        ])
    }

    #[test]
    fn tool_names_round_trip() {
        for kind in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(kind.name()), Some(kind));
            assert_eq!(kind.parameters()["type"], "object");
        }
        assert_eq!(ToolKind::from_name("Delete"), None);
    }

    #[test]
    fn scrape_error_mentions_url() {
        let err = ToolError::Scrape {
            url: "https://unreachable.invalid/".into(),
            reason: "dns error".into(),
        };
        assert_eq!(
            err.to_string(),
            "Error scraping https://unreachable.invalid/: dns error"
        );
    }

    #[test]
    fn truncate_chars_is_utf8_safe() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[test]
    fn parse_input_accepts_json_and_bare_strings() {
        assert_eq!(
            parse_input(ToolKind::Search, r#"{"query": " change streams "}"#).unwrap(),
            "change streams"
        );
        assert_eq!(
            parse_input(ToolKind::ScrapeWeb, "https://example.com").unwrap(),
            "https://example.com"
        );
        assert_eq!(parse_input(ToolKind::LatestNews, "{}").unwrap(), "");
        assert!(parse_input(ToolKind::Search, r#"{"q": "x"}"#).is_err());
    }

    #[tokio::test]
    async fn invoke_dispatches_by_name() {
        let out = registry().invoke("Search", r#"{"query":"sharding"}"#).await;
        assert_eq!(out, "Search:sharding");
    }

    #[tokio::test]
    async fn invoke_renders_errors_as_text() {
        let reg = registry();
        let out = reg.invoke("ScrapeWeb", r#"{"url":"fail"}"#).await;
        assert!(out.starts_with("Error scraping https://example.com/x"));

        let out = reg.invoke("LatestNews", "{}").await;
        assert_eq!(out, "unknown tool: LatestNews");

        let out = reg.invoke("Nope", "{}").await;
        assert!(out.contains("unknown tool"));
    }
}
