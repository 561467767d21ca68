//! Researcher: gathers sources and facts for every outline section.

use std::time::Duration;

use tracing::debug;

use crate::{AgentConfig, AgentRole, ToolKind};

pub fn create() -> AgentConfig {
    debug!("creating researcher agent");
    AgentConfig {
        role: AgentRole::Researcher,
        goal: "Research and gather comprehensive information about MongoDB topics",
        backstory: "You are a meticulous technical researcher with expertise in \
                    database technologies who uses search and web scraping tools. You excel at \
                    finding, validating, and synthesizing technical information from multiple \
                    sources. You understand MongoDB deeply and can evaluate the credibility of \
                    technical content. Be smart on using the tools and don't overuse them, \
                    keeping to at most 3-4 requests a minute.",
        tools: vec![ToolKind::Search, ToolKind::ScrapeWeb],
        max_iterations: 10,
        temperature: 0.3,
        request_timeout: Duration::from_secs(300),
        allow_delegation: false,
    }
}

pub fn task_prompt(outline: &str) -> String {
    debug!(outline_len = outline.len(), "building research prompt");
    format!(
        "Research and gather detailed information based on the following blog outline:\n\
         \n\
         {outline}\n\
         \n\
         For each section in the outline:\n\
         1. Find relevant technical documentation, articles, and real-world examples\n\
         2. Gather specific code examples, configuration snippets, or architectural diagrams\n\
         3. Identify key statistics, benchmarks, or performance metrics if applicable\n\
         4. Look for expert opinions, best practices, and common pitfalls\n\
         5. Find recent updates or changes related to each topic\n\
         \n\
         Compile your research in a structured markdown format with:\n\
         - Source citations for each piece of information making sure those links are active\n\
         - Direct quotes where appropriate\n\
         - Technical specifications and version details\n\
         - Active and working links to official documentation or reliable sources\n\
         \n\
         Focus on accuracy and technical depth while ensuring the information is\n\
         recent and relevant."
    )
}
