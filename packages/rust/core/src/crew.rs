//! End-to-end run: topic → outline → research → draft → edited post → file.

use std::path::PathBuf;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use tracing::{error, info, instrument};

use blogcrew_agents::{AgentConfig, AgentRole, editor, planner, researcher, writer};
use blogcrew_markdown::{BlogPost, clean_final_output, extract_title_or};
use blogcrew_shared::{AppConfig, Result, RunId, Topic};

use crate::engine::ExecutionEngine;
use crate::library;
use crate::task::{Stage, StageOutput, Task};

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Receives coarse progress updates during a run.
pub trait ProgressReporter: Send + Sync {
    /// `fraction` is in `0.0..=1.0` and never decreases within a run.
    fn update(&self, message: &str, fraction: f32);

    /// Called when a stage starts, after the matching `update`.
    fn stage_started(&self, _stage: Stage) {}
}

impl<F> ProgressReporter for F
where
    F: Fn(&str, f32) + Send + Sync,
{
    fn update(&self, message: &str, fraction: f32) {
        self(message, fraction)
    }
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn update(&self, _message: &str, _fraction: f32) {}
}

/// Lifecycle of a run as seen by a front-end.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RunStatus {
    #[default]
    Idle,
    Running { stage: Stage },
    Completed { path: PathBuf },
    Failed { message: String },
}

impl RunStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Where and how the finished post is written.
#[derive(Debug, Clone)]
pub struct CrewSettings {
    pub blog_dir: PathBuf,
    /// Title used when the final post has no heading.
    pub default_title: String,
    pub tags: Vec<String>,
}

impl CrewSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            blog_dir: PathBuf::from(&config.defaults.blog_dir),
            default_title: config.blog.default_title.clone(),
            tags: config.blog.tags.clone(),
        }
    }
}

impl Default for CrewSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Crew
// ---------------------------------------------------------------------------

/// One blog generation run and the agents it owns.
pub struct BlogCrew {
    run_id: RunId,
    topic: Option<Topic>,
    settings: CrewSettings,
    planner: AgentConfig,
    researcher: AgentConfig,
    writer: AgentConfig,
    editor: AgentConfig,
}

impl BlogCrew {
    pub fn new(topic: Option<Topic>, settings: CrewSettings) -> Self {
        let run_id = RunId::new();
        info!(
            %run_id,
            topic = topic.as_ref().map_or("AI-chosen topic", Topic::as_str),
            "initializing blog crew"
        );

        Self {
            run_id,
            topic,
            settings,
            planner: AgentRole::Planner.create(),
            researcher: AgentRole::Researcher.create(),
            writer: AgentRole::Writer.create(),
            editor: AgentRole::Editor.create(),
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn topic(&self) -> Option<&Topic> {
        self.topic.as_ref()
    }

    pub fn settings(&self) -> &CrewSettings {
        &self.settings
    }

    /// Run all four stages and save the post. Returns the saved file's path.
    ///
    /// On failure the error is logged, reported as `Error occurred: ...` at
    /// fraction 1.0, and returned; nothing is left on disk.
    #[instrument(skip_all, fields(run_id = %self.run_id))]
    pub async fn run(
        &self,
        engine: &dyn ExecutionEngine,
        progress: &dyn ProgressReporter,
    ) -> Result<PathBuf> {
        let started = Instant::now();

        match self.run_stages(engine, progress).await {
            Ok(path) => {
                info!(
                    path = %path.display(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "blog generation complete"
                );
                progress.update("Blog generated successfully!", 1.0);
                Ok(path)
            }
            Err(e) => {
                error!(error = %e, "error in blog creation process");
                progress.update(&format!("Error occurred: {e}"), 1.0);
                Err(e)
            }
        }
    }

    async fn run_stages(
        &self,
        engine: &dyn ExecutionEngine,
        progress: &dyn ProgressReporter,
    ) -> Result<PathBuf> {
        progress.update("Creating blog generation tasks...", 0.15);
        let planning = Task::for_stage(
            Stage::Planning,
            planner::task_prompt(self.topic.as_ref()),
            self.planner.clone(),
        )?;

        progress.update("Starting crew tasks execution...", 0.30);
        let outline = self.execute(engine, progress, planning).await?;

        let research_task = Task::for_stage(
            Stage::Researching,
            researcher::task_prompt(outline.content()),
            self.researcher.clone(),
        )?;
        let research = self.execute(engine, progress, research_task).await?;

        let writing = Task::for_stage(
            Stage::Writing,
            writer::task_prompt(outline.content(), research.content()),
            self.writer.clone(),
        )?;
        let draft = self.execute(engine, progress, writing).await?;

        let today = Local::now().date_naive();
        let working_title = extract_title_or(outline.content(), &self.settings.default_title);
        let editing = Task::for_stage(
            Stage::Editing,
            editor::task_prompt(draft.content(), &working_title, today),
            self.editor.clone(),
        )?;
        let final_post = self.execute(engine, progress, editing).await?;

        progress.update("Finalizing and saving blog...", 0.95);
        let post = self.finalize(final_post.content(), today);
        info!(title = %post.meta.title, words = post.word_count(), "extracted blog title");

        library::save_post(&self.settings.blog_dir, &post)
    }

    async fn execute(
        &self,
        engine: &dyn ExecutionEngine,
        progress: &dyn ProgressReporter,
        task: Task,
    ) -> Result<StageOutput> {
        let stage = task.stage();
        progress.update(stage.message(), stage.progress());
        progress.stage_started(stage);

        info!(
            %stage,
            agent = task.agent().label(),
            output = task.output_name(),
            prompt_len = task.description().len(),
            "stage started"
        );
        let started = Instant::now();

        let content = engine.execute(&task).await?;

        info!(
            %stage,
            output_len = content.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "stage completed"
        );
        Ok(StageOutput::new(stage, content))
    }

    /// Turn the editor's reply into the post that gets saved.
    fn finalize(&self, raw: &str, date: NaiveDate) -> BlogPost {
        let body = clean_final_output(raw);
        let title = extract_title_or(&body, &self.settings.default_title);
        BlogPost::new(title, date, self.settings.tags.clone(), body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use blogcrew_shared::BlogCrewError;

    use crate::library::{list_blogs, load_blog};

    /// Returns canned text per stage and records the tasks it saw.
    struct ScriptedEngine {
        final_post: String,
        fail_at: Option<Stage>,
        seen: Mutex<Vec<(Stage, Vec<Stage>, String)>>,
    }

    impl ScriptedEngine {
        fn new(final_post: &str) -> Self {
            Self {
                final_post: final_post.into(),
                fail_at: None,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing_at(stage: Stage) -> Self {
            Self {
                fail_at: Some(stage),
                ..Self::new("# unused")
            }
        }

        fn seen(&self) -> Vec<(Stage, Vec<Stage>, String)> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ExecutionEngine for ScriptedEngine {
        async fn execute(&self, task: &Task) -> Result<String> {
            self.seen.lock().unwrap().push((
                task.stage(),
                task.context().to_vec(),
                task.description().to_string(),
            ));

            if self.fail_at == Some(task.stage()) {
                return Err(BlogCrewError::Llm("model unavailable".into()));
            }

            Ok(match task.stage() {
                Stage::Planning => "# Outline: Change Streams Deep Dive\n\n## Intro".into(),
                Stage::Researching => "RESEARCH NOTES".into(),
                Stage::Writing => "DRAFT TEXT".into(),
                Stage::Editing => self.final_post.clone(),
            })
        }
    }

    fn settings() -> CrewSettings {
        CrewSettings {
            blog_dir: std::env::temp_dir()
                .join(format!("blogcrew-crew-test-{}", uuid::Uuid::now_v7())),
            ..CrewSettings::default()
        }
    }

    fn recorder() -> (std::sync::Arc<Mutex<Vec<(String, f32)>>>, impl Fn(&str, f32) + Send + Sync) {
        let log = std::sync::Arc::new(Mutex::new(Vec::new()));
        let sink = std::sync::Arc::clone(&log);
        (log, move |msg: &str, f: f32| {
            sink.lock().unwrap().push((msg.to_string(), f));
        })
    }

    #[tokio::test]
    async fn run_saves_one_post() {
        let settings = settings();
        let dir = settings.blog_dir.clone();
        let topic = Topic::parse(Some("change streams"));
        let crew = BlogCrew::new(topic, settings);
        let engine = ScriptedEngine::new(
            "```markdown\n# Change Streams in Production\n\nReal-time apps.\nSecond line.\n```",
        );

        let path = crew.run(&engine, &SilentProgress).await.unwrap();

        assert_eq!(list_blogs(&dir), vec![path.clone()]);
        assert_eq!(path, dir.join("change-streams-in-production.md"));

        let post = load_blog(&path).unwrap();
        assert_eq!(post.meta.title, "Change Streams in Production");
        assert_eq!(post.meta.tags, vec!["mongodb", "databases", "technical"]);
        assert_eq!(
            post.meta.description,
            "# Change Streams in Production"
        );
        assert_eq!(post.meta.date, Local::now().date_naive());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn stages_are_wired_in_order() {
        let settings = settings();
        let dir = settings.blog_dir.clone();
        let crew = BlogCrew::new(Topic::parse(Some("change streams")), settings);
        let engine = ScriptedEngine::new("# Final\n\nBody");

        crew.run(&engine, &SilentProgress).await.unwrap();
        let seen = engine.seen();

        let stages: Vec<Stage> = seen.iter().map(|(s, _, _)| *s).collect();
        assert_eq!(stages, Stage::ALL.to_vec());
        assert_eq!(seen[1].1, vec![Stage::Planning]);
        assert_eq!(seen[2].1, vec![Stage::Planning, Stage::Researching]);
        assert_eq!(seen[3].1, vec![Stage::Writing]);

        assert!(seen[0].2.contains("about change streams in MongoDB"));
        assert!(seen[1].2.contains("# Outline: Change Streams Deep Dive"));
        assert!(seen[2].2.contains("RESEARCH NOTES"));
        assert!(seen[3].2.contains("DRAFT TEXT"));
        // the editor works with the outline's title
        assert!(seen[3].2.contains("- Title: Outline: Change Streams Deep Dive"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_heading_uses_default_title() {
        let settings = settings();
        let dir = settings.blog_dir.clone();
        let crew = BlogCrew::new(None, settings);
        let engine = ScriptedEngine::new("No heading at all.\nJust text.");

        let path = crew.run(&engine, &SilentProgress).await.unwrap();
        assert_eq!(path, dir.join("mongodb-technical-blog.md"));
        assert_eq!(load_blog(&path).unwrap().meta.title, "MongoDB Technical Blog");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn repeated_runs_do_not_overwrite() {
        let settings = settings();
        let dir = settings.blog_dir.clone();

        let first = BlogCrew::new(None, settings.clone())
            .run(&ScriptedEngine::new("# Same\n\nOne"), &SilentProgress)
            .await
            .unwrap();
        let second = BlogCrew::new(None, settings)
            .run(&ScriptedEngine::new("# Same\n\nTwo"), &SilentProgress)
            .await
            .unwrap();

        assert_ne!(first, second);
        assert!(load_blog(&first).unwrap().body.contains("One"));
        assert!(load_blog(&second).unwrap().body.contains("Two"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn progress_is_monotonic() {
        let settings = settings();
        let dir = settings.blog_dir.clone();
        let (log, reporter) = recorder();

        BlogCrew::new(None, settings)
            .run(&ScriptedEngine::new("# P\n\nbody"), &reporter)
            .await
            .unwrap();

        let fractions: Vec<f32> = log.lock().unwrap().iter().map(|(_, f)| *f).collect();
        assert_eq!(fractions, vec![0.15, 0.30, 0.35, 0.50, 0.65, 0.80, 0.95, 1.0]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn failure_reports_and_leaves_nothing() {
        let settings = settings();
        let dir = settings.blog_dir.clone();
        let (log, reporter) = recorder();
        let engine = ScriptedEngine::failing_at(Stage::Writing);

        let err = BlogCrew::new(None, settings)
            .run(&engine, &reporter)
            .await
            .unwrap_err();

        assert!(matches!(err, BlogCrewError::Llm(_)));
        assert_eq!(engine.seen().len(), 3);
        assert!(list_blogs(&dir).is_empty());

        let log = log.lock().unwrap();
        let (msg, fraction) = log.last().unwrap();
        assert_eq!(msg, "Error occurred: llm error: model unavailable");
        assert_eq!(*fraction, 1.0);
    }

    #[test]
    fn finalize_unwraps_fenced_reply_with_lead_in() {
        let crew = BlogCrew::new(None, settings());
        let raw = "Here is the edited blog post:\n\n```markdown\n# Mastering Change Streams\n\nBody text.\n```\n";
        let post = crew.finalize(raw, NaiveDate::from_ymd_opt(2024, 5, 20).unwrap());

        assert_eq!(post.meta.title, "Mastering Change Streams");
        assert!(post.body.starts_with("# Mastering Change Streams"));
        assert!(!post.body.contains("```"));
    }

    #[test]
    fn run_status_defaults_to_idle() {
        assert_eq!(RunStatus::default(), RunStatus::Idle);
        assert!(RunStatus::Running { stage: Stage::Writing }.is_running());
        assert!(!RunStatus::Failed { message: "x".into() }.is_running());
    }
}
