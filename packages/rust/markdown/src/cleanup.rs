//! Cleanup pipeline for the editor's final Markdown output.
//!
//! Each cleanup pass is a function `&str -> String` applied in sequence.
//! The pipeline unwraps fenced replies, drops model-authored frontmatter and
//! change notes, then normalizes headings and whitespace.

use std::sync::LazyLock;

use regex::Regex;

use crate::split_frontmatter;

/// Run the full cleanup pipeline on a raw model reply.
pub(crate) fn run_pipeline(md: &str) -> String {
    let mut result = md.replace("\r\n", "\n");

    result = strip_enclosing_fence(&result);
    result = strip_frontmatter(&result);
    result = strip_change_summary(&result);
    result = normalize_headings(&result);
    result = clean_blank_lines(&result);
    result = normalize_whitespace(&result);
    result = ensure_trailing_newline(&result);

    result
}

// ---------------------------------------------------------------------------
// Pass 1: Unwrap a reply fenced as a single code block
// ---------------------------------------------------------------------------

/// Models often wrap the whole post in ```` ```markdown ... ``` ````,
/// sometimes after a short lead-in such as "Here is the edited post:".
fn strip_enclosing_fence(md: &str) -> String {
    static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)\A\s*```(?:markdown|md)?[ \t]*\n(.*)\n```\s*\z").expect("valid regex")
    });
    static LABELLED_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)\A(.*?)\n```(?:markdown|md)[ \t]*\n(.*)\n```\s*\z").expect("valid regex")
    });

    // A fenced post with inner fences keeps its closing ``` balanced; only
    // unwrap when the inner text has an even number of fences.
    let balanced = |inner: &str| inner.matches("```").count() % 2 == 0;

    if let Some(caps) = FENCE_RE.captures(md) {
        if balanced(&caps[1]) {
            return caps[1].to_string();
        }
        return md.to_string();
    }

    match LABELLED_FENCE_RE.captures(md) {
        Some(caps) if is_lead_in(&caps[1]) && balanced(&caps[2]) => caps[2].to_string(),
        _ => md.to_string(),
    }
}

/// A short chatty line or two before the fence, with no Markdown structure.
fn is_lead_in(text: &str) -> bool {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    lines.len() <= 2 && lines.iter().all(|l| !l.starts_with('#') && !l.starts_with("```"))
}

// ---------------------------------------------------------------------------
// Pass 2: Drop frontmatter written by the model
// ---------------------------------------------------------------------------

/// The published file gets its own frontmatter; a model-written block would
/// end up duplicated inside the body.
fn strip_frontmatter(md: &str) -> String {
    let trimmed = md.trim_start();
    match split_frontmatter(trimmed) {
        (Some(_), body) => body.to_string(),
        (None, _) => md.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Pass 3: Drop a trailing "summary of changes" section
// ---------------------------------------------------------------------------

/// Remove the editor's change log if it trails the post.
fn strip_change_summary(md: &str) -> String {
    static SUMMARY_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?im)^(?:-{3,}\s*\n+)?(?:#{1,6}\s*|\*\*)?summary of (?:major |key )?(?:changes|edits)\b")
            .expect("valid regex")
    });

    match SUMMARY_RE.find(md) {
        Some(m) if m.start() > 0 => md[..m.start()].trim_end().to_string(),
        _ => md.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Pass 4: Normalize heading levels
// ---------------------------------------------------------------------------

/// Ensure there's at most one H1; later H1s are demoted to H2.
fn normalize_headings(md: &str) -> String {
    static H_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("valid regex"));

    let mut h1_count = 0;
    let mut in_code_block = false;
    let mut lines: Vec<String> = Vec::new();

    for line in md.lines() {
        if line.trim_start().starts_with("```") {
            in_code_block = !in_code_block;
        }

        if !in_code_block {
            if let Some(caps) = H_RE.captures(line) {
                if &caps[1] == "#" {
                    h1_count += 1;
                    if h1_count > 1 {
                        lines.push(format!("## {}", &caps[2]));
                        continue;
                    }
                }
            }
        }
        lines.push(line.to_string());
    }

    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Pass 5: Clean up excessive blank lines
// ---------------------------------------------------------------------------

/// Collapse runs of 3+ blank lines into exactly 2.
fn clean_blank_lines(md: &str) -> String {
    static MULTI_BLANK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{4,}").expect("valid regex"));

    MULTI_BLANK_RE.replace_all(md, "\n\n\n").to_string()
}

// ---------------------------------------------------------------------------
// Pass 6: Normalize whitespace
// ---------------------------------------------------------------------------

/// Trim trailing whitespace on each line and leading blank lines on the post.
fn normalize_whitespace(md: &str) -> String {
    md.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_start_matches('\n')
        .to_string()
}

// ---------------------------------------------------------------------------
// Pass 7: Ensure trailing newline
// ---------------------------------------------------------------------------

/// Ensure the text ends with exactly one newline.
fn ensure_trailing_newline(md: &str) -> String {
    let trimmed = md.trim_end_matches('\n');
    format!("{trimmed}\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_enclosing_fence_unwraps_markdown_block() {
        let input = "```markdown\n# Title\n\nBody text\n```";
        assert_eq!(strip_enclosing_fence(input), "# Title\n\nBody text");
    }

    #[test]
    fn strip_enclosing_fence_keeps_inner_code_blocks() {
        let input = "```markdown\n# Title\n\n```js\ndb.find()\n```\n\nEnd\n```\n";
        let result = strip_enclosing_fence(input);
        assert!(result.starts_with("# Title"));
        assert!(result.contains("```js\ndb.find()\n```"));
        assert!(result.ends_with("End"));
    }

    #[test]
    fn strip_enclosing_fence_drops_lead_in_line() {
        let input = "Here is the edited blog post:\n\n```markdown\n# Mastering Change Streams\n\nBody text.\n```\n";
        assert_eq!(
            strip_enclosing_fence(input),
            "# Mastering Change Streams\n\nBody text."
        );
    }

    #[test]
    fn strip_enclosing_fence_keeps_post_ending_in_code() {
        let input = "# Title\n\nIntro.\n\n## Setup\n\n```md\n# example heading\n```\n";
        assert_eq!(strip_enclosing_fence(input), input);
    }

    #[test]
    fn strip_enclosing_fence_ignores_plain_posts() {
        let input = "# Title\n\n```js\ndb.find()\n```\n";
        assert_eq!(strip_enclosing_fence(input), input);
    }

    #[test]
    fn strip_frontmatter_removes_model_block() {
        let input = "---\ntitle: Draft\ntags: [a]\n---\n# Real Title\n\nBody";
        assert_eq!(strip_frontmatter(input), "# Real Title\n\nBody");
    }

    #[test]
    fn strip_frontmatter_leaves_horizontal_rules() {
        let input = "# Title\n\n---\n\nMore";
        assert_eq!(strip_frontmatter(input), input);
    }

    #[test]
    fn strip_change_summary_drops_trailing_notes() {
        let input = "# Title\n\nBody.\n\n---\n\n## Summary of Major Changes\n\n- fixed typos";
        let result = strip_change_summary(input);
        assert_eq!(result, "# Title\n\nBody.");
    }

    #[test]
    fn strip_change_summary_keeps_post_without_notes() {
        let input = "# Title\n\n## Summary\n\nWrap-up paragraph.";
        assert_eq!(strip_change_summary(input), input);
    }

    #[test]
    fn normalize_headings_demotes_duplicate_h1() {
        let input = "# Title\n\nSome text\n\n# Another Title\n\nMore text";
        let result = normalize_headings(input);
        assert_eq!(result, "# Title\n\nSome text\n\n## Another Title\n\nMore text");
    }

    #[test]
    fn normalize_headings_skips_code_comments() {
        let input = "# Title\n\n```bash\n# install\nnpm i\n```";
        assert_eq!(normalize_headings(input), input);
    }

    #[test]
    fn clean_blank_lines_collapses_excess() {
        let input = "Line 1\n\n\n\n\nLine 2";
        assert_eq!(clean_blank_lines(input), "Line 1\n\n\nLine 2");
    }

    #[test]
    fn normalize_whitespace_trims_trailing() {
        let input = "\n\nLine 1   \nLine 2\t\nLine 3";
        assert_eq!(normalize_whitespace(input), "Line 1\nLine 2\nLine 3");
    }

    #[test]
    fn ensure_trailing_newline_normalizes_multiple() {
        assert_eq!(ensure_trailing_newline("Content"), "Content\n");
        assert_eq!(ensure_trailing_newline("Content\n\n\n"), "Content\n");
    }

    #[test]
    fn full_pipeline_cleans_editor_reply() {
        let input = "```markdown\n---\ntitle: x\n---\n# Title\n\n\n\n\n\n# Second\n\nBody   \n\n**Summary of changes**\n- tweaks\n```";
        let result = run_pipeline(input);

        assert!(result.starts_with("# Title"));
        assert!(result.contains("## Second"));
        assert!(!result.contains("title: x"));
        assert!(!result.contains("tweaks"));
        assert!(!result.contains("\n\n\n\n"));
        assert!(result.ends_with("Body\n"));
    }
}
