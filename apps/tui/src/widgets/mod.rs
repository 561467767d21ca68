//! Reusable TUI widgets.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use blogcrew_core::RunStatus;

/// Bottom status bar, tinted by the state of the current run.
pub(crate) fn status_bar<'a>(msg: &'a str, run: &RunStatus) -> Paragraph<'a> {
    let bg = match run {
        RunStatus::Running { .. } => Color::Blue,
        RunStatus::Failed { .. } => Color::Red,
        RunStatus::Idle | RunStatus::Completed { .. } => Color::DarkGray,
    };
    Paragraph::new(format!(" {msg}")).style(Style::default().bg(bg).fg(Color::White))
}
