//! Planner: picks or sharpens the topic and produces the outline.

use std::time::Duration;

use tracing::debug;

use blogcrew_shared::Topic;

use crate::{AgentConfig, AgentRole, ToolKind};

pub fn create() -> AgentConfig {
    debug!("creating planner agent");
    AgentConfig {
        role: AgentRole::Planner,
        goal: "Plan and outline compelling technical blog posts about MongoDB",
        backstory: "You are an experienced technical blog planner with deep knowledge \
                    of MongoDB and database technologies. You stay up-to-date with the latest \
                    MongoDB developments and know how to structure content for maximum engagement.",
        tools: vec![ToolKind::Search, ToolKind::LatestNews],
        max_iterations: 3,
        temperature: 0.7,
        request_timeout: Duration::from_secs(120),
        allow_delegation: false,
    }
}

/// Outline prompt for a given topic, or one asking the planner to choose.
pub fn task_prompt(topic: Option<&Topic>) -> String {
    match topic {
        Some(topic) => format!(
            "Analyze and create a detailed blog post outline about {topic} in MongoDB.\n\
             If the topic is not specific enough, focus on the most recent and relevant aspect of it.\n\
             \n\
             1. Research the latest developments, updates, and best practices about this topic\n\
             2. Create a compelling outline with:\n\
             {OUTLINE_STRUCTURE}\n\
             \n\
             Format the outline in markdown with clear hierarchical structure.\n\
             Include relevant technical terms and concepts to be covered."
        ),
        None => format!(
            "Research and identify a cutting-edge MongoDB topic for a technical blog post.\n\
             Focus on recent developments, new features, or innovative use cases.\n\
             \n\
             1. Search for recent MongoDB news, releases, and discussions\n\
             2. Identify 2-3 potential topics and select the most promising one\n\
             3. Create a detailed outline following this structure:\n\
             {OUTLINE_STRUCTURE}\n\
             \n\
             Format the outline in markdown with clear hierarchical structure.\n\
             The total blog length should be 1500-2000 words.\n\
             Include relevant technical terms and concepts to be covered."
        ),
    }
}

const OUTLINE_STRUCTURE: &str = "   - An attention-grabbing title\n   \
                                 - 4-6 main sections\n   \
                                 - Key points to cover in each section\n   \
                                 - Suggestions for code examples or diagrams\n   \
                                 - Target word count for each section";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_prompt_names_topic() {
        let topic = Topic::parse(Some("Queryable Encryption")).unwrap();
        let prompt = task_prompt(Some(&topic));
        assert!(prompt.starts_with("Analyze and create a detailed blog post outline about Queryable Encryption in MongoDB."));
        assert!(prompt.contains("   - 4-6 main sections\n"));
        assert!(!prompt.contains("cutting-edge"));
    }

    #[test]
    fn open_prompt_asks_planner_to_choose() {
        let prompt = task_prompt(None);
        assert!(prompt.contains("identify a cutting-edge MongoDB topic"));
        assert!(prompt.contains("1500-2000 words"));
    }
}
