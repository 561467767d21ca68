//! The boundary between the pipeline and whatever runs the language model.

use async_trait::async_trait;

use blogcrew_shared::Result;

use crate::task::Task;

/// Executes one task and returns the agent's final text.
///
/// The pipeline only sequences tasks; prompting, tool calling and iteration
/// caps all live behind this trait.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    async fn execute(&self, task: &Task) -> Result<String>;
}
