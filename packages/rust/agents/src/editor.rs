//! Editor: final review pass over the draft.

use std::time::Duration;

use chrono::NaiveDate;
use tracing::debug;

use crate::{AgentConfig, AgentRole};

pub fn create() -> AgentConfig {
    debug!("creating editor agent");
    AgentConfig {
        role: AgentRole::Editor,
        goal: "Ensure technical blog posts are accurate, well-written, and properly formatted",
        backstory: "You are a meticulous editor with extensive experience in \
                    technical content. You have a sharp eye for detail, strong command of \
                    English grammar, and deep understanding of technical writing best \
                    practices. You ensure content is not only accurate but also engaging \
                    and accessible.",
        tools: Vec::new(),
        max_iterations: 2,
        temperature: 0.4,
        request_timeout: Duration::from_secs(120),
        allow_delegation: false,
    }
}

/// Editing prompt. `date` is the publication date shown in the metadata.
pub fn task_prompt(draft: &str, title: &str, date: NaiveDate) -> String {
    debug!(%title, draft_len = draft.len(), "building editing prompt");
    let date = date.format("%Y-%m-%d");
    format!(
        "Review and edit the following technical blog post:\n\
         \n\
         {draft}\n\
         \n\
         Tasks:\n\
         1. Check for technical accuracy and clarity\n\
         2. Ensure proper grammar, spelling, and punctuation\n\
         3. Verify markdown formatting is correct\n\
         4. Confirm appropriate use of emojis and formatting\n\
         5. Check code examples for correctness\n\
         6. Ensure consistent tone and style\n\
         7. Verify section flow and logical progression\n\
         8. Check word count (target: 1500-2000 words)\n\
         9. Keep this metadata in mind for the final version:\n   \
            - Title: {title}\n   \
            - Date: {date}\n\
         \n\
         Return only the edited post in markdown, starting with its `#` title heading."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_title_and_date() {
        let date = NaiveDate::from_ymd_opt(2024, 11, 5).unwrap();
        let prompt = task_prompt("# Draft\n\nBody", "Atlas Vector Search in Practice", date);
        assert!(prompt.contains("- Title: Atlas Vector Search in Practice\n"));
        assert!(prompt.contains("- Date: 2024-11-05\n"));
        assert!(prompt.contains("\n\n# Draft\n\nBody\n\n"));
    }

    #[test]
    fn prompt_is_pure() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(task_prompt("d", "t", date), task_prompt("d", "t", date));
    }
}
