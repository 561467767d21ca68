//! Pipeline orchestration for blogcrew.
//!
//! This crate ties the agents, tools and markdown helpers into one run
//! (`BlogCrew::run`), defines the engine boundary, ships the OpenRouter
//! engine, and manages the on-disk blog library.

pub mod crew;
pub mod engine;
pub mod library;
pub mod openrouter;
pub mod task;

pub use crew::{BlogCrew, CrewSettings, ProgressReporter, RunStatus, SilentProgress};
pub use engine::ExecutionEngine;
pub use library::{list_blogs, load_blog, save_post};
pub use openrouter::OpenRouterEngine;
pub use task::{Stage, StageOutput, Task};
