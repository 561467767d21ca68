//! "Browse Blogs" screen: saved posts with a metadata and body preview.

use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use blogcrew_core::{list_blogs, load_blog};
use blogcrew_markdown::BlogPost;

pub(crate) struct BrowseBlogsScreen {
    blog_dir: PathBuf,
    entries: Vec<PathBuf>,
    selected: usize,
    /// Parsed selected post, or the reason it could not be read.
    preview: Option<Result<BlogPost, String>>,
    scroll: u16,
    status: String,
}

impl BrowseBlogsScreen {
    pub(crate) fn new(blog_dir: PathBuf) -> Self {
        let mut screen = Self {
            blog_dir,
            entries: Vec::new(),
            selected: 0,
            preview: None,
            scroll: 0,
            status: String::new(),
        };
        screen.refresh();
        screen
    }

    /// Rescan the blog directory, keeping the selection where possible.
    pub(crate) fn refresh(&mut self) {
        let current = self.entries.get(self.selected).cloned();
        self.entries = list_blogs(&self.blog_dir);
        self.selected = current
            .and_then(|p| self.entries.iter().position(|e| *e == p))
            .unwrap_or(0);
        self.status = format!(
            "{} post(s) in {} · 'r' to refresh",
            self.entries.len(),
            self.blog_dir.display()
        );
        self.load_preview();
    }

    /// Rescan and move the selection to `path`.
    pub(crate) fn select_path(&mut self, path: &Path) {
        self.refresh();
        if let Some(idx) = self.entries.iter().position(|e| e == path) {
            self.selected = idx;
            self.load_preview();
        }
    }

    fn load_preview(&mut self) {
        self.scroll = 0;
        self.preview = self
            .entries
            .get(self.selected)
            .map(|path| load_blog(path).map_err(|e| e.to_string()));
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Min(1),    // List + preview
                Constraint::Length(1), // Status
            ])
            .split(area);
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(rows[0]);

        if self.entries.is_empty() {
            let empty = Paragraph::new(
                "No blog posts yet.\n\nUse the 'Create Blog' tab to generate one, \
                 or press 'r' to rescan.",
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Blog Posts "));
            f.render_widget(empty, cols[0]);
        } else {
            let items: Vec<ListItem> = self
                .entries
                .iter()
                .enumerate()
                .map(|(i, path)| {
                    let name = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let (style, prefix) = if i == self.selected {
                        (
                            Style::default()
                                .fg(Color::Cyan)
                                .add_modifier(Modifier::BOLD),
                            "▸ ",
                        )
                    } else {
                        (Style::default(), "  ")
                    };
                    ListItem::new(format!("{prefix}{name}")).style(style)
                })
                .collect();

            let list = List::new(items).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Blog Posts ({}) ", self.entries.len())),
            );
            f.render_widget(list, cols[0]);
        }

        let preview_block = Block::default().borders(Borders::ALL).title(" Preview ");
        let preview = match &self.preview {
            Some(Ok(post)) => Paragraph::new(preview_lines(post)),
            Some(Err(e)) => Paragraph::new(format!("Could not read post: {e}"))
                .style(Style::default().fg(Color::Red)),
            None => Paragraph::new("Select a post to preview it.")
                .style(Style::default().fg(Color::DarkGray)),
        };
        f.render_widget(
            preview
                .block(preview_block)
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0)),
            cols[1],
        );

        let status = Paragraph::new(self.status.as_str())
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(status, rows[1]);
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected > 0 {
                    self.selected -= 1;
                    self.load_preview();
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.entries.len() {
                    self.selected += 1;
                    self.load_preview();
                }
            }
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::Char('r') => self.refresh(),
            _ => {}
        }
    }
}

fn preview_lines(post: &BlogPost) -> Vec<Line<'_>> {
    let label = Style::default().fg(Color::Cyan);
    let mut lines = vec![
        Line::from(post.meta.title.as_str()).style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(vec![
            Span::styled("Date: ", label),
            Span::raw(post.meta.date.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Tags: ", label),
            Span::raw(post.meta.tags.join(", ")),
        ]),
        Line::from(vec![
            Span::styled("Words: ", label),
            Span::raw(post.word_count().to_string()),
        ]),
        Line::from(vec![
            Span::styled("Description: ", label),
            Span::raw(post.meta.description.as_str()),
        ]),
        Line::from(""),
    ];
    lines.extend(post.body.lines().map(Line::from));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("blogcrew-tui-browse-{}", uuid::Uuid::now_v7()))
    }

    fn save(dir: &Path, title: &str) -> PathBuf {
        let post = BlogPost::new(
            title.into(),
            NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            vec!["mongodb".into()],
            format!("# {title}\n\nSome body text.\n"),
        );
        blogcrew_core::save_post(dir, &post).unwrap()
    }

    #[test]
    fn empty_dir_has_no_preview() {
        let screen = BrowseBlogsScreen::new(temp_dir());
        assert!(screen.entries.is_empty());
        assert!(screen.preview.is_none());
    }

    #[test]
    fn navigation_loads_preview() {
        let dir = temp_dir();
        save(&dir, "Alpha Post");
        save(&dir, "Beta Post");

        let mut screen = BrowseBlogsScreen::new(dir.clone());
        assert_eq!(screen.entries.len(), 2);
        let title = |s: &BrowseBlogsScreen| match &s.preview {
            Some(Ok(post)) => post.meta.title.clone(),
            other => panic!("unexpected preview: {other:?}"),
        };
        assert_eq!(title(&screen), "Alpha Post");

        screen.handle_key(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(title(&screen), "Beta Post");
        screen.handle_key(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(screen.selected, 1);
        screen.handle_key(KeyCode::Char('k'), KeyModifiers::NONE);
        assert_eq!(title(&screen), "Alpha Post");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn select_path_picks_new_post() {
        let dir = temp_dir();
        save(&dir, "Alpha Post");
        let mut screen = BrowseBlogsScreen::new(dir.clone());

        let zeta = save(&dir, "Zeta Post");
        screen.select_path(&zeta);
        assert_eq!(screen.entries.len(), 2);
        assert_eq!(screen.entries[screen.selected], zeta);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
