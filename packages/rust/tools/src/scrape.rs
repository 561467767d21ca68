//! Page scraping: fetch a URL and extract the readable text of its main
//! content region.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

use blogcrew_shared::{BlogCrewError, Result};

use crate::{Tool, ToolError, ToolKind, truncate_chars};

/// Upper bound on the text handed back to a model.
pub const MAX_SCRAPE_CHARS: usize = 8000;

/// Text fragments this short or shorter are dropped.
const MIN_FRAGMENT_CHARS: usize = 20;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Main-content selectors, most specific first.
const CONTENT_SELECTORS: [&str; 6] = [
    "article",
    "main",
    ".post-content",
    ".article-content",
    "#content",
    ".content",
];

/// Page chrome whose text never counts as content.
const SKIPPED_TAGS: [&str; 5] = ["script", "style", "nav", "header", "footer"];

/// Extracted text of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedPage {
    pub url: String,
    pub text: String,
}

impl ScrapedPage {
    /// `Source: {url}` header plus text, capped at [`MAX_SCRAPE_CHARS`].
    pub fn render(&self) -> String {
        truncate_chars(
            &format!("Source: {}\n\n{}", self.url, self.text),
            MAX_SCRAPE_CHARS,
        )
    }
}

/// HTTP fetcher for the `ScrapeWeb` tool.
#[derive(Debug, Clone)]
pub struct PageScraper {
    client: Client,
}

impl PageScraper {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BlogCrewError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    #[instrument(skip(self))]
    pub async fn scrape(&self, url: &str) -> std::result::Result<ScrapedPage, ToolError> {
        let fail = |reason: String| ToolError::Scrape {
            url: url.to_string(),
            reason,
        };

        let parsed = Url::parse(url).map_err(|e| fail(format!("invalid URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(fail(format!("unsupported scheme '{}'", parsed.scheme())));
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?
            .error_for_status()
            .map_err(|e| fail(e.to_string()))?;

        let html = response
            .text()
            .await
            .map_err(|e| fail(format!("failed to read body: {e}")))?;

        let text = extract_main_text(&html);
        info!(chars = text.chars().count(), "scraped page");

        Ok(ScrapedPage {
            url: url.to_string(),
            text,
        })
    }
}

/// Readable text of the page's main content region.
///
/// Fragments longer than 20 characters are kept and separated by a blank
/// line; text inside page chrome is ignored.
pub fn extract_main_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = main_region(&document).unwrap_or_else(|| document.root_element());

    let mut fragments: Vec<String> = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let Some(parent) = node.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        if in_skipped_element(parent) {
            continue;
        }

        let fragment = text.trim();
        if fragment.chars().count() > MIN_FRAGMENT_CHARS {
            fragments.push(
                fragment
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }
    }

    fragments.join("\n\n")
}

fn main_region(document: &Html) -> Option<ElementRef<'_>> {
    for selector in CONTENT_SELECTORS {
        let Ok(sel) = Selector::parse(selector) else {
            continue;
        };
        if let Some(el) = document.select(&sel).find(|el| !in_skipped_element(*el)) {
            debug!(selector, "found main content region");
            return Some(el);
        }
    }
    debug!("no content region found, using whole document");
    None
}

fn in_skipped_element(element: ElementRef<'_>) -> bool {
    std::iter::once(*element)
        .chain(element.ancestors())
        .filter_map(|n| n.value().as_element())
        .any(|e| SKIPPED_TAGS.contains(&e.name()))
}

/// The `ScrapeWeb` tool.
pub struct ScrapeTool {
    scraper: PageScraper,
}

impl ScrapeTool {
    pub fn new(scraper: PageScraper) -> Self {
        Self { scraper }
    }
}

#[async_trait]
impl Tool for ScrapeTool {
    fn kind(&self) -> ToolKind {
        ToolKind::ScrapeWeb
    }

    async fn call(&self, input: &str) -> std::result::Result<String, ToolError> {
        let url = input.trim().trim_matches('"');
        Ok(self.scraper.scrape(url).await?.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE_PAGE: &str = r#"<html>
<head><title>Ignored title</title><style>.x { color: red; } /* long style text here */</style></head>
<body>
  <header><p>Site header text that is definitely long enough</p></header>
  <nav><a href="/">Navigation link with a very long label</a></nav>
  <div class="content"><p>Fallback content region that should lose to article.</p></div>
  <article>
    <h1>Short</h1>
    <p>Change streams let applications react to data changes in real time.</p>
    <script>console.log("script text that is long enough to count");</script>
    <p>Resume tokens make it possible to continue after a failure.</p>
  </article>
  <footer><p>Copyright footer text long enough to be kept otherwise</p></footer>
</body>
</html>"#;

    #[test]
    fn extracts_article_text_only() {
        let text = extract_main_text(ARTICLE_PAGE);
        assert_eq!(
            text,
            "Change streams let applications react to data changes in real time.\n\n\
             Resume tokens make it possible to continue after a failure."
        );
    }

    #[test]
    fn falls_back_through_selector_priority() {
        let html = r#"<body><div id="content"><p>Content div paragraph with plenty of words.</p></div>
            <div class="content"><p>Second region paragraph with plenty of words.</p></div></body>"#;
        let text = extract_main_text(html);
        assert!(text.contains("Content div paragraph"));
        assert!(!text.contains("Second region"));
    }

    #[test]
    fn whole_document_when_no_region_matches() {
        let html = r#"<body><header><p>Header text that is long enough to count</p></header>
            <div><p>Body paragraph that is long enough to count.</p></div>
            <p>tiny</p></body>"#;
        let text = extract_main_text(html);
        assert_eq!(text, "Body paragraph that is long enough to count.");
    }

    #[test]
    fn article_inside_header_is_not_main_content() {
        let html = r#"<body><header><article><p>Teaser article inside the header chrome.</p></article></header>
            <main><p>The real main content paragraph lives here.</p></main></body>"#;
        assert_eq!(
            extract_main_text(html),
            "The real main content paragraph lives here."
        );
    }

    #[test]
    fn render_is_capped() {
        let page = ScrapedPage {
            url: "https://example.com/long".into(),
            text: "é".repeat(20_000),
        };
        let out = page.render();
        assert_eq!(out.chars().count(), MAX_SCRAPE_CHARS);
        assert!(out.starts_with("Source: https://example.com/long\n\n"));
    }

    #[tokio::test]
    async fn scrape_fetches_and_extracts() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/blog/change-streams"))
            .and(wiremock::matchers::header("user-agent", USER_AGENT))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string(ARTICLE_PAGE)
                    .insert_header("content-type", "text/html"),
            )
            .mount(&server)
            .await;

        let url = format!("{}/blog/change-streams", server.uri());
        let page = PageScraper::new().unwrap().scrape(&url).await.unwrap();

        assert_eq!(page.url, url);
        assert!(page.text.starts_with("Change streams let applications"));
        assert!(page.render().starts_with(&format!("Source: {url}\n\n")));
    }

    #[tokio::test]
    async fn scrape_http_error_is_typed() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = format!("{}/missing", server.uri());
        let err = PageScraper::new().unwrap().scrape(&url).await.unwrap_err();
        assert!(matches!(err, ToolError::Scrape { .. }));
        assert!(err.to_string().starts_with(&format!("Error scraping {url}: ")));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn unreachable_url_error_contains_url() {
        let scraper = PageScraper::new().unwrap();

        let err = scraper.scrape("http://127.0.0.1:1/post").await.unwrap_err();
        assert!(err.to_string().contains("http://127.0.0.1:1/post"));

        let err = scraper.scrape("not a url").await.unwrap_err();
        assert!(err.to_string().contains("Error scraping not a url"));

        let err = scraper.scrape("ftp://example.com/file").await.unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }
}
