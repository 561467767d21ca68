//! The one error type shared by the blogcrew library crates.
//!
//! A failed stage, search call or save surfaces as a [`BlogCrewError`]; the
//! `blogcrew` and `blogcrew-tui` binaries turn it into a `color-eyre` report.

use std::path::PathBuf;

/// Why a blog generation run (or a library call around it) failed.
#[derive(Debug, thiserror::Error)]
pub enum BlogCrewError {
    /// Unreadable `blogcrew.toml`, or an API key env var that is unset.
    #[error("config error: {message}")]
    Config { message: String },

    /// An HTTP client could not be built or a backend was unreachable.
    #[error("network error: {0}")]
    Network(String),

    /// A saved post whose frontmatter is missing or not valid YAML.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// OpenRouter rejected a request or answered with nothing usable.
    #[error("llm error: {0}")]
    Llm(String),

    /// Reading or writing a post under the blog directory failed.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A task wired to a later stage, or no free filename for a slug.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Result alias for the library crates.
pub type Result<T> = std::result::Result<T, BlogCrewError>;

impl BlogCrewError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Attach the post or directory path to an I/O failure.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = BlogCrewError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = BlogCrewError::validation("upstream stage editing is not earlier");
        assert!(err.to_string().contains("upstream stage editing"));

        let err = BlogCrewError::Llm("empty completion".into());
        assert_eq!(err.to_string(), "llm error: empty completion");
    }

    #[test]
    fn io_error_keeps_path() {
        let err = BlogCrewError::io(
            "data/blogs/post.md",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("data/blogs/post.md"));
        assert!(msg.contains("denied"));
    }
}
