//! Writer: turns outline and research into a full draft.

use std::time::Duration;

use tracing::debug;

use crate::{AgentConfig, AgentRole};

pub fn create() -> AgentConfig {
    debug!("creating writer agent");
    AgentConfig {
        role: AgentRole::Writer,
        goal: "Write engaging and informative technical blog posts about MongoDB",
        backstory: "You are a skilled technical writer who specializes in creating \
                    clear, engaging content about complex database technologies. You have a \
                    knack for making technical concepts accessible while maintaining accuracy. \
                    You write in a professional yet fun and conversational tone and know how to \
                    incorporate technical details effectively.",
        tools: Vec::new(),
        max_iterations: 3,
        temperature: 0.0,
        request_timeout: Duration::from_secs(180),
        allow_delegation: false,
    }
}

pub fn task_prompt(outline: &str, research: &str) -> String {
    debug!(
        outline_len = outline.len(),
        research_len = research.len(),
        "building writing prompt"
    );
    format!(
        "Write a comprehensive technical blog post based on the following outline\n\
         and research:\n\
         \n\
         OUTLINE:\n\
         {outline}\n\
         \n\
         RESEARCH:\n\
         {research}\n\
         \n\
         Requirements:\n\
         1. Write in a professional but engaging tone\n\
         2. Include appropriate emojis and formatting to enhance readability\n\
         3. Incorporate code examples with proper markdown formatting\n\
         4. Use technical terms accurately but explain them clearly\n\
         5. Total length should be 1500-2000 words\n\
         6. Include a brief introduction and conclusion\n\
         7. Break up text with appropriate headings and subheadings\n\
         8. Add relevant emoji icons at section headings\n\
         9. Include practical tips and real-world applications\n\
         10. Format the entire post in markdown\n\
         \n\
         The final blog should be technically accurate while being accessible to\n\
         developers with basic MongoDB knowledge. Make complex concepts clear through\n\
         analogies and examples where appropriate."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_orders_outline_before_research() {
        let prompt = task_prompt("OUTLINE-TEXT", "RESEARCH-TEXT");
        let outline_at = prompt.find("OUTLINE:\nOUTLINE-TEXT").unwrap();
        let research_at = prompt.find("RESEARCH:\nRESEARCH-TEXT").unwrap();
        assert!(outline_at < research_at);
        assert!(prompt.contains("10. Format the entire post in markdown"));
    }
}
