//! Core TUI application state and event loop.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};

use tracing::{info, warn};

use blogcrew_shared::AppConfig;

use crate::screens::{BrowseBlogsScreen, CreateBlogScreen, ScreenId};
use crate::widgets::status_bar;

/// Application state.
pub(crate) struct App {
    /// Currently active screen tab.
    pub active_tab: usize,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Status message shown in bottom bar.
    pub status: String,
    /// Whether help overlay is visible.
    pub show_help: bool,
    pub create: CreateBlogScreen,
    pub browse: BrowseBlogsScreen,
}

impl App {
    pub(crate) fn new(config: AppConfig) -> Self {
        let blog_dir = PathBuf::from(&config.defaults.blog_dir);
        Self {
            active_tab: 0,
            should_quit: false,
            status: "Ready · press ? for help".to_string(),
            show_help: false,
            create: CreateBlogScreen::new(config),
            browse: BrowseBlogsScreen::new(blog_dir),
        }
    }

    fn current(&self) -> ScreenId {
        ScreenId::ALL[self.active_tab]
    }

    fn is_editing(&self) -> bool {
        self.current() == ScreenId::CreateBlog && self.create.is_editing()
    }

    fn switch_to(&mut self, idx: usize) {
        self.active_tab = idx;
        self.status = self.current().to_string();
    }

    /// Pull worker events into the create screen and react to completion.
    fn tick(&mut self) {
        match self.create.poll_events() {
            Some(Ok(path)) => {
                info!(path = %path.display(), "blog post ready");
                self.browse.select_path(&path);
                self.status = format!("Blog generated successfully! Saved to {}", path.display());
            }
            Some(Err(message)) => {
                warn!(error = %message, "generation failed");
                self.status = format!("Error occurred: {message}");
            }
            None => {}
        }
    }
}

/// Entry point: sets up terminal, runs event loop, restores terminal.
pub(crate) fn run(config: AppConfig) -> Result<()> {
    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, App::new(config));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| draw(f, &app))?;

        // Poll for events with 100ms timeout for responsive UI
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(&mut app, key.code, key.modifiers);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    // Global keybindings (always active)
    match code {
        KeyCode::Char('q') | KeyCode::Char('c')
            if modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('q') if !app.is_editing() => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('?') if !app.is_editing() => {
            app.show_help = !app.show_help;
            return;
        }
        KeyCode::Esc if app.show_help => {
            app.show_help = false;
            return;
        }
        // Tab navigation with number keys
        KeyCode::Char(c @ '1'..='2') if !app.is_editing() => {
            let idx = (c as usize) - ('1' as usize);
            app.switch_to(idx);
            return;
        }
        KeyCode::Tab if !app.is_editing() => {
            app.switch_to((app.active_tab + 1) % ScreenId::ALL.len());
            return;
        }
        KeyCode::BackTab if !app.is_editing() => {
            let idx = if app.active_tab == 0 {
                ScreenId::ALL.len() - 1
            } else {
                app.active_tab - 1
            };
            app.switch_to(idx);
            return;
        }
        _ => {}
    }

    // If help is showing, consume any key to dismiss
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Delegate to current screen
    match app.current() {
        ScreenId::CreateBlog => app.create.handle_key(code, modifiers),
        ScreenId::BrowseBlogs => app.browse.handle_key(code, modifiers),
    }
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Tab bar
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    // Tab bar
    let tab_titles: Vec<Line> = ScreenId::ALL
        .iter()
        .map(|s| Line::from(format!("{s}")))
        .collect();

    let tabs = Tabs::new(tab_titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" blogcrew "),
        )
        .select(app.active_tab)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" │ ");

    f.render_widget(tabs, chunks[0]);

    // Content area
    match app.current() {
        ScreenId::CreateBlog => app.create.draw(f, chunks[1]),
        ScreenId::BrowseBlogs => app.browse.draw(f, chunks[1]),
    }

    // Status bar
    let bar = status_bar(&app.status, app.create.status());
    f.render_widget(bar, chunks[2]);

    // Help overlay
    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());

    let help_text = vec![
        Line::from("Keybindings").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  1-2          Switch to screen"),
        Line::from("  Tab/S-Tab    Next/previous screen"),
        Line::from("  ?            Toggle this help"),
        Line::from("  q / Ctrl-C   Quit"),
        Line::from(""),
        Line::from("Screen-specific:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  Enter / e    Edit the topic (Create Blog)"),
        Line::from("  Esc          Stop editing"),
        Line::from("  g            Generate a blog post"),
        Line::from("  ↑/↓ or j/k   Select a post (Browse Blogs)"),
        Line::from("  PgUp/PgDn    Scroll the preview"),
        Line::from("  r            Refresh the post list"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help · press any key to close ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    // Clear background
    f.render_widget(ratatui::widgets::Clear, area);
    f.render_widget(help, area);
}

/// Create a centered rectangle with percentage width and height.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
