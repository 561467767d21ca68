//! Pipeline stages and the tasks that drive them.

use blogcrew_agents::{AgentConfig, AgentRole};
use blogcrew_shared::{BlogCrewError, Result};

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// One step of the linear pipeline. Ordering follows execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Planning,
    Researching,
    Writing,
    Editing,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Planning,
        Stage::Researching,
        Stage::Writing,
        Stage::Editing,
    ];

    /// Agent role that executes this stage.
    pub fn role(self) -> AgentRole {
        match self {
            Self::Planning => AgentRole::Planner,
            Self::Researching => AgentRole::Researcher,
            Self::Writing => AgentRole::Writer,
            Self::Editing => AgentRole::Editor,
        }
    }

    /// Declared output identifier.
    pub fn output_name(self) -> &'static str {
        match self {
            Self::Planning => "blog_outline.md",
            Self::Researching => "research_content.md",
            Self::Writing => "blog_draft.md",
            Self::Editing => "final_blog.md",
        }
    }

    pub fn expected_output(self) -> &'static str {
        match self {
            Self::Planning => "Detailed blog outline in markdown format",
            Self::Researching => "Comprehensive research content in markdown format",
            Self::Writing => "Draft of the blog post in markdown format",
            Self::Editing => "Finalized blog post in markdown format",
        }
    }

    /// Stages whose outputs this stage reads.
    pub fn upstream(self) -> &'static [Stage] {
        match self {
            Self::Planning => &[],
            Self::Researching => &[Stage::Planning],
            Self::Writing => &[Stage::Planning, Stage::Researching],
            Self::Editing => &[Stage::Writing],
        }
    }

    /// Progress fraction reported when the stage starts.
    pub fn progress(self) -> f32 {
        match self {
            Self::Planning => 0.35,
            Self::Researching => 0.50,
            Self::Writing => 0.65,
            Self::Editing => 0.80,
        }
    }

    /// Progress message reported when the stage starts.
    pub fn message(self) -> &'static str {
        match self {
            Self::Planning => "Planning the blog outline...",
            Self::Researching => "Researching the outline topics...",
            Self::Writing => "Writing the blog draft...",
            Self::Editing => "Editing the final post...",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Researching => "researching",
            Self::Writing => "writing",
            Self::Editing => "editing",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// A unit of work: one rendered prompt bound to one agent.
#[derive(Debug, Clone)]
pub struct Task {
    stage: Stage,
    description: String,
    agent: AgentConfig,
    context: Vec<Stage>,
}

impl Task {
    /// Build a task, rejecting upstream references that are not strictly
    /// earlier than `stage` and agents that do not own the stage.
    pub fn new(
        stage: Stage,
        description: impl Into<String>,
        agent: AgentConfig,
        context: Vec<Stage>,
    ) -> Result<Self> {
        if let Some(bad) = context.iter().find(|&&upstream| upstream >= stage) {
            return Err(BlogCrewError::validation(format!(
                "task '{stage}' cannot read from '{bad}': upstream stages must run earlier"
            )));
        }
        if agent.role() != stage.role() {
            return Err(BlogCrewError::validation(format!(
                "task '{stage}' requires the {} agent, got {}",
                stage.role(),
                agent.role()
            )));
        }

        Ok(Self {
            stage,
            description: description.into(),
            agent,
            context,
        })
    }

    /// Build the task with its standard upstream wiring.
    pub fn for_stage(stage: Stage, description: impl Into<String>, agent: AgentConfig) -> Result<Self> {
        Self::new(stage, description, agent, stage.upstream().to_vec())
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn agent(&self) -> &AgentConfig {
        &self.agent
    }

    pub fn context(&self) -> &[Stage] {
        &self.context
    }

    pub fn expected_output(&self) -> &'static str {
        self.stage.expected_output()
    }

    pub fn output_name(&self) -> &'static str {
        self.stage.output_name()
    }
}

/// Text produced by one completed stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput {
    stage: Stage,
    content: String,
}

impl StageOutput {
    pub fn new(stage: Stage, content: String) -> Self {
        Self { stage, content }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}
