//! File-based tracing setup.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use color_eyre::eyre::{Result, WrapErr};
use tracing_subscriber::{EnvFilter, fmt};

const LOG_DIR: &str = "logs";

/// Append logs to `logs/blogcrew-YYYY-MM-DD.log`, filtered by `RUST_LOG`
/// (default `blogcrew=info`).
pub(crate) fn init_file_logging() -> Result<PathBuf> {
    std::fs::create_dir_all(LOG_DIR).wrap_err("failed to create log directory")?;

    let path = PathBuf::from(LOG_DIR).join(format!(
        "blogcrew-{}.log",
        chrono::Local::now().format("%Y-%m-%d")
    ));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .wrap_err_with(|| format!("failed to open log file {}", path.display()))?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blogcrew=info"));

    fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    tracing::info!(path = %path.display(), "TUI logging initialized");
    Ok(path)
}
