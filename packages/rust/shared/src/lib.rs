//! Shared types, error model, and configuration for blogcrew.
//!
//! This crate is the foundation depended on by all other blogcrew crates.
//! It provides:
//! - [`BlogCrewError`]: the unified error type
//! - Domain types ([`Topic`], [`RunId`], [`BlogMeta`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BlogConfig, DefaultsConfig, OpenRouterConfig, SearchConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, read_env_key,
    validate_api_keys,
};
pub use error::{BlogCrewError, Result};
pub use types::{BlogMeta, RunId, Topic};
