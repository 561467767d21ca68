//! Role configurations and task prompts for the four blog agents.
//!
//! Each role module exposes `create()`, returning an immutable
//! [`AgentConfig`], and a pure `task_prompt(..)` that renders the task
//! description from upstream stage outputs.

pub mod editor;
pub mod planner;
pub mod researcher;
pub mod writer;

use std::time::Duration;

pub use blogcrew_tools::ToolKind;

/// The four agents of a run, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRole {
    Planner,
    Researcher,
    Writer,
    Editor,
}

impl AgentRole {
    pub const ALL: [AgentRole; 4] = [
        AgentRole::Planner,
        AgentRole::Researcher,
        AgentRole::Writer,
        AgentRole::Editor,
    ];

    /// Human-readable role, used as the model's persona name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Planner => "Technical Blog Planner",
            Self::Researcher => "Technical Content Researcher",
            Self::Writer => "Technical Blog Writer",
            Self::Editor => "Technical Content Editor",
        }
    }

    /// Build this role's configuration.
    pub fn create(self) -> AgentConfig {
        match self {
            Self::Planner => planner::create(),
            Self::Researcher => researcher::create(),
            Self::Writer => writer::create(),
            Self::Editor => editor::create(),
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How one agent is invoked. Read-only once created.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    role: AgentRole,
    goal: &'static str,
    backstory: &'static str,
    tools: Vec<ToolKind>,
    max_iterations: u32,
    temperature: f32,
    request_timeout: Duration,
    allow_delegation: bool,
}

impl AgentConfig {
    pub fn role(&self) -> AgentRole {
        self.role
    }

    pub fn label(&self) -> &'static str {
        self.role.label()
    }

    pub fn goal(&self) -> &'static str {
        self.goal
    }

    pub fn backstory(&self) -> &'static str {
        self.backstory
    }

    /// Tools the agent may call. Empty for the writer and editor.
    pub fn tools(&self) -> &[ToolKind] {
        &self.tools
    }

    /// Cap on tool-calling rounds before an answer is forced.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn allow_delegation(&self) -> bool {
        self.allow_delegation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parameters() {
        let cases = [
            (AgentRole::Planner, 3, 0.7, 120, vec![ToolKind::Search, ToolKind::LatestNews]),
            (AgentRole::Researcher, 10, 0.3, 300, vec![ToolKind::Search, ToolKind::ScrapeWeb]),
            (AgentRole::Writer, 3, 0.0, 180, vec![]),
            (AgentRole::Editor, 2, 0.4, 120, vec![]),
        ];

        for (role, iters, temp, timeout, tools) in cases {
            let config = role.create();
            assert_eq!(config.role(), role);
            assert_eq!(config.max_iterations(), iters, "{role}");
            assert!((config.temperature() - temp).abs() < f32::EPSILON, "{role}");
            assert_eq!(config.request_timeout(), Duration::from_secs(timeout), "{role}");
            assert_eq!(config.tools(), tools.as_slice(), "{role}");
            assert!(!config.allow_delegation());
            assert!(!config.goal().is_empty());
            assert!(!config.backstory().is_empty());
        }
    }

    #[test]
    fn labels_are_distinct() {
        let labels: std::collections::HashSet<_> =
            AgentRole::ALL.iter().map(|r| r.label()).collect();
        assert_eq!(labels.len(), 4);
        assert_eq!(AgentRole::Editor.create().label(), "Technical Content Editor");
    }
}
