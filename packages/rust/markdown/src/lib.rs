//! Markdown helpers for generated blog posts.
//!
//! Covers everything the pipeline does with the final Markdown text:
//! cleaning the editor's reply, extracting a title, deriving a filename slug
//! and description, and rendering/parsing the YAML frontmatter document.

mod cleanup;

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use blogcrew_shared::{BlogCrewError, BlogMeta, Result};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A published post: frontmatter plus Markdown body.
#[derive(Debug, Clone, PartialEq)]
pub struct BlogPost {
    pub meta: BlogMeta,
    pub body: String,
}

impl BlogPost {
    /// Build a post from a cleaned body, deriving the description.
    pub fn new(title: String, date: NaiveDate, tags: Vec<String>, body: String) -> Self {
        let description = describe(&body);
        Self {
            meta: BlogMeta {
                title,
                date,
                tags,
                description,
            },
            body,
        }
    }

    /// Render the full document: `---\n<yaml>---\n\n<body>`.
    pub fn render(&self) -> Result<String> {
        let yaml = serde_yaml::to_string(&self.meta)
            .map_err(|e| BlogCrewError::parse(format!("frontmatter serialization failed: {e}")))?;
        let body = self.body.trim_start_matches('\n').trim_end();
        Ok(format!("---\n{yaml}---\n\n{body}\n"))
    }

    /// Parse a document previously produced by [`BlogPost::render`].
    pub fn parse(text: &str) -> Result<Self> {
        let (Some(yaml), body) = split_frontmatter(text) else {
            return Err(BlogCrewError::parse("document has no frontmatter block"));
        };

        let meta: BlogMeta = serde_yaml::from_str(yaml)
            .map_err(|e| BlogCrewError::parse(format!("invalid frontmatter: {e}")))?;

        Ok(Self {
            meta,
            body: body.trim_start_matches('\n').to_string(),
        })
    }

    /// Approximate word count of the body.
    pub fn word_count(&self) -> usize {
        count_words(&self.body)
    }
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Normalize the editor's reply into a publishable Markdown body.
pub fn clean_final_output(raw: &str) -> String {
    let cleaned = cleanup::run_pipeline(raw);
    debug!(raw_len = raw.len(), cleaned_len = cleaned.len(), "final output cleaned");
    cleaned
}

/// Return the text of the first `#` heading, or `None` when there is none.
///
/// Leading `#` characters and an optional closing `#` sequence are stripped
/// and the rest trimmed. Headings with no text are skipped. Headings outside
/// fenced code win; a heading inside a fence is used only when the text has
/// no other heading.
pub fn extract_title(md: &str) -> Option<String> {
    let mut in_fence = false;
    let mut fenced = None;

    for line in md.lines() {
        let line = line.trim();
        if line.starts_with("```") || line.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        let Some(title) = heading_text(line) else {
            continue;
        };
        if !in_fence {
            return Some(title);
        }
        if fenced.is_none() {
            fenced = Some(title);
        }
    }

    fenced
}

fn heading_text(line: &str) -> Option<String> {
    if !line.starts_with('#') {
        return None;
    }
    let text = line.trim_start_matches('#').trim();
    // A closing `#` run only counts when separated by whitespace ("C#" stays).
    let without_closing = text.trim_end_matches('#');
    let title = if without_closing.ends_with(char::is_whitespace) {
        without_closing.trim_end()
    } else {
        text
    };
    (!title.is_empty()).then(|| title.to_string())
}

/// [`extract_title`] with a fallback for posts without any heading.
pub fn extract_title_or(md: &str, fallback: &str) -> String {
    match extract_title(md) {
        Some(title) => {
            debug!(%title, "found title heading");
            title
        }
        None => {
            debug!(fallback, "no heading found, using default title");
            fallback.to_string()
        }
    }
}

/// Derive a filename stem: lower-case, with spaces and path separators
/// replaced by `-`.
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '-',
            other => other,
        })
        .collect()
}

/// Description for the frontmatter: the first two lines of the body.
pub fn describe(body: &str) -> String {
    body.lines()
        .take(2)
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Count words in Markdown (excluding fenced code blocks).
pub fn count_words(md: &str) -> usize {
    static CODE_BLOCK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("valid regex"));

    let without_code = CODE_BLOCK_RE.replace_all(md, "");
    without_code
        .split_whitespace()
        .filter(|w| !w.chars().all(|c| c == '#'))
        .count()
}

/// Split a leading `---` YAML block from the rest of the text.
pub fn split_frontmatter(text: &str) -> (Option<&str>, &str) {
    static FM_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)\A---[ \t]*\r?\n(.*?)\r?\n---[ \t]*(?:\r?\n|\z)").expect("valid regex")
    });

    match FM_RE.captures(text) {
        Some(caps) => {
            let yaml = caps.get(1).map_or("", |m| m.as_str());
            let end = caps.get(0).map_or(0, |m| m.end());
            (Some(yaml), &text[end..])
        }
        None => (None, text),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
