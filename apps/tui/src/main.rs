//! blogcrew TUI: start blog generation runs and browse saved posts.
//!
//! Two tabs, "Create Blog" and "Browse Blogs", built with `ratatui` +
//! `crossterm`. Logs go to `logs/blogcrew-YYYY-MM-DD.log` so they never
//! draw over the terminal UI.

mod app;
mod logging;
mod screens;
mod widgets;

use color_eyre::eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;
    logging::init_file_logging()?;
    let config = blogcrew_shared::load_config()?;
    app::run(config)
}
