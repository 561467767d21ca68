//! "Create Blog" screen: topic input, generate action, progress and log.
//!
//! A run executes on its own thread with a private tokio runtime and reports
//! back over a channel that the UI loop drains every tick.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph};
use tracing::{error, info};

use blogcrew_core::{BlogCrew, CrewSettings, OpenRouterEngine, ProgressReporter, RunStatus, Stage};
use blogcrew_shared::{AppConfig, Topic, validate_api_keys};

/// Messages sent from the worker thread to the screen.
#[derive(Debug)]
pub(crate) enum RunEvent {
    Progress { message: String, fraction: f32 },
    StageStarted(Stage),
    Finished(Result<PathBuf, String>),
}

/// Forwards crew progress to the UI thread.
struct ChannelProgress {
    tx: Sender<RunEvent>,
}

impl ProgressReporter for ChannelProgress {
    fn update(&self, message: &str, fraction: f32) {
        let _ = self.tx.send(RunEvent::Progress {
            message: message.to_string(),
            fraction,
        });
    }

    fn stage_started(&self, stage: Stage) {
        let _ = self.tx.send(RunEvent::StageStarted(stage));
    }
}

pub(crate) struct CreateBlogScreen {
    config: AppConfig,
    topic: String,
    editing: bool,
    status: RunStatus,
    progress: f32,
    log: Vec<String>,
    events: Option<Receiver<RunEvent>>,
}

impl CreateBlogScreen {
    pub(crate) fn new(config: AppConfig) -> Self {
        Self {
            config,
            topic: String::new(),
            editing: false,
            status: RunStatus::Idle,
            progress: 0.0,
            log: vec!["Enter a topic (or leave it empty) and press 'g' to generate.".to_string()],
            events: None,
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    pub(crate) fn status(&self) -> &RunStatus {
        &self.status
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Topic
                Constraint::Length(1), // Action hint
                Constraint::Length(3), // Progress gauge
                Constraint::Min(1),    // Message log
            ])
            .split(area);

        // Topic field
        let topic_style = if self.editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let topic_block = Block::default()
            .borders(Borders::ALL)
            .title(" Blog topic (optional) ")
            .border_style(topic_style);
        let topic_text = if self.topic.is_empty() && !self.editing {
            Paragraph::new("Let the planner choose a trending MongoDB topic")
                .style(Style::default().fg(Color::DarkGray))
        } else {
            Paragraph::new(self.topic.as_str())
        };
        f.render_widget(topic_text.block(topic_block), chunks[0]);

        // Action hint
        let hint = if self.editing {
            "Type the topic · Enter/Esc to stop editing"
        } else if self.status.is_running() {
            "Generating... this can take several minutes"
        } else {
            "Enter to edit topic · g to generate"
        };
        let hint_p = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint_p, chunks[1]);

        // Progress
        let (label, color) = match &self.status {
            RunStatus::Idle => ("Idle".to_string(), Color::DarkGray),
            RunStatus::Running { stage } => (format!("Running: {stage}"), Color::Cyan),
            RunStatus::Completed { .. } => ("Completed".to_string(), Color::Green),
            RunStatus::Failed { .. } => ("Failed".to_string(), Color::Red),
        };
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" Progress "))
            .gauge_style(Style::default().fg(color))
            .ratio(f64::from(self.progress.clamp(0.0, 1.0)))
            .label(format!("{label} ({:.0}%)", self.progress * 100.0));
        f.render_widget(gauge, chunks[2]);

        // Message log, newest at the bottom
        let visible = chunks[3].height.saturating_sub(2) as usize;
        let items: Vec<ListItem> = self
            .log
            .iter()
            .skip(self.log.len().saturating_sub(visible))
            .map(|line| ListItem::new(line.as_str()))
            .collect();
        let log = List::new(items).block(Block::default().borders(Borders::ALL).title(" Messages "));
        f.render_widget(log, chunks[3]);
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) {
        if self.editing {
            match code {
                KeyCode::Esc | KeyCode::Enter => self.editing = false,
                KeyCode::Backspace => {
                    self.topic.pop();
                }
                KeyCode::Char(c) => self.topic.push(c),
                _ => {}
            }
            return;
        }

        match code {
            KeyCode::Enter | KeyCode::Char('e') if !self.status.is_running() => {
                self.editing = true;
            }
            KeyCode::Char('g') => self.start_generation(),
            _ => {}
        }
    }

    /// Validate keys, build the engine and spawn the worker thread.
    fn start_generation(&mut self) {
        if self.status.is_running() {
            self.push_log("A generation is already running.");
            return;
        }

        if let Err(e) = validate_api_keys(&self.config) {
            self.fail(e.to_string());
            return;
        }
        let engine = match OpenRouterEngine::from_config(&self.config, None) {
            Ok(engine) => engine,
            Err(e) => {
                self.fail(e.to_string());
                return;
            }
        };

        let topic = Topic::parse(Some(self.topic.as_str()));
        let crew = BlogCrew::new(topic, CrewSettings::from_config(&self.config));
        info!(run_id = %crew.run_id(), "starting generation from TUI");

        let (tx, rx) = mpsc::channel();
        self.events = Some(rx);
        self.status = RunStatus::Running {
            stage: Stage::Planning,
        };
        self.progress = 0.0;
        self.log.clear();
        self.push_log(match crew.topic() {
            Some(topic) => format!("Generating a blog post about {topic}"),
            None => "Generating a blog post on an AI-chosen topic".to_string(),
        });

        std::thread::spawn(move || {
            let outcome = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => {
                    let reporter = ChannelProgress { tx: tx.clone() };
                    rt.block_on(crew.run(&engine, &reporter))
                        .map_err(|e| e.to_string())
                }
                Err(e) => {
                    error!(error = %e, "failed to start async runtime");
                    Err(format!("failed to start async runtime: {e}"))
                }
            };
            let _ = tx.send(RunEvent::Finished(outcome));
        });
    }

    /// Drain pending worker events. Returns the outcome when a run has
    /// just finished.
    pub(crate) fn poll_events(&mut self) -> Option<Result<PathBuf, String>> {
        let mut completed = None;

        loop {
            let event = match self.events.as_ref().map(Receiver::try_recv) {
                Some(Ok(event)) => event,
                Some(Err(TryRecvError::Empty)) | None => break,
                Some(Err(TryRecvError::Disconnected)) => {
                    self.events = None;
                    if self.status.is_running() {
                        let message = "generation worker stopped unexpectedly".to_string();
                        self.fail(message.clone());
                        completed = Some(Err(message));
                    }
                    break;
                }
            };

            if let Some(outcome) = self.apply(event) {
                completed = Some(outcome);
            }
        }

        completed
    }

    fn apply(&mut self, event: RunEvent) -> Option<Result<PathBuf, String>> {
        match event {
            RunEvent::Progress { message, fraction } => {
                self.progress = self.progress.max(fraction);
                // failures arrive again as `Finished`; keep the log to one line
                if !message.starts_with("Error occurred") {
                    self.push_log(message);
                }
                None
            }
            RunEvent::StageStarted(stage) => {
                self.status = RunStatus::Running { stage };
                None
            }
            RunEvent::Finished(Ok(path)) => {
                self.progress = 1.0;
                self.push_log(format!("Saved to {}", path.display()));
                self.status = RunStatus::Completed { path: path.clone() };
                self.events = None;
                Some(Ok(path))
            }
            RunEvent::Finished(Err(message)) => {
                self.fail(message.clone());
                self.events = None;
                Some(Err(message))
            }
        }
    }

    fn fail(&mut self, message: String) {
        self.progress = 1.0;
        self.push_log(format!("Error occurred: {message}"));
        self.status = RunStatus::Failed { message };
    }

    fn push_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }
}
