//! OpenRouter chat-completions engine with a bounded tool-calling loop.
//!
//! Each task becomes one conversation: a system message with the agent's
//! persona, a user message with the task, then alternating assistant tool
//! calls and tool results until the model answers or the agent's iteration
//! cap is hit. At the cap, one last request without tools forces an answer.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use blogcrew_agents::{AgentConfig, ToolKind};
use blogcrew_shared::{AppConfig, BlogCrewError, Result, read_env_key};
use blogcrew_tools::ToolRegistry;

use crate::engine::ExecutionEngine;
use crate::task::Task;

/// Appended when the iteration cap is reached.
const FINAL_ANSWER_PROMPT: &str = "You have reached the tool-call limit for this task. \
     Using what you have gathered so far, write your final answer now without calling any tools.";

/// Error bodies are cut to this many characters in messages.
const MAX_ERROR_BODY: usize = 500;

// ---------------------------------------------------------------------------
// Wire types (OpenAI-compatible)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [Value]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    fn tool_result(call_id: &str, content: String) -> Self {
        Self {
            role: "tool".into(),
            content: Some(content),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: FunctionCall,
}

fn function_type() -> String {
    "function".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// [`ExecutionEngine`] backed by the OpenRouter API.
pub struct OpenRouterEngine {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    tools: Arc<ToolRegistry>,
}

impl OpenRouterEngine {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        tools: ToolRegistry,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("blogcrew/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BlogCrewError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            tools: Arc::new(tools),
        })
    }

    /// Engine from `[openrouter]` settings, with live search and scrape tools.
    /// `model` overrides the configured default model.
    pub fn from_config(config: &AppConfig, model: Option<&str>) -> Result<Self> {
        let api_key = read_env_key(&config.openrouter.api_key_env)?;
        let tools = ToolRegistry::from_config(config)?;
        let model = model.unwrap_or(&config.openrouter.default_model);
        Self::new(config.openrouter.base_url.clone(), api_key, model, tools)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Function declarations for the agent's tools that are actually live.
    fn tool_definitions(&self, granted: &[ToolKind]) -> Vec<Value> {
        let live = self.tools.kinds();
        granted
            .iter()
            .filter(|kind| live.contains(*kind))
            .map(|kind| {
                json!({
                    "type": "function",
                    "function": {
                        "name": kind.name(),
                        "description": kind.description(),
                        "parameters": kind.parameters(),
                    }
                })
            })
            .collect()
    }

    async fn complete(
        &self,
        agent: &AgentConfig,
        messages: &[ChatMessage],
        tools: Option<&[Value]>,
    ) -> Result<ChatMessage> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: agent.temperature(),
            tools,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("X-Title", "blogcrew")
            .timeout(agent.request_timeout())
            .json(&request)
            .send()
            .await
            .map_err(|e| BlogCrewError::Llm(format!("request to OpenRouter failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BlogCrewError::Llm(format!("failed to read OpenRouter response: {e}")))?;

        if !status.is_success() {
            let snippet: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(BlogCrewError::Llm(format!("OpenRouter returned HTTP {status}: {snippet}")));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| BlogCrewError::Llm(format!("invalid OpenRouter response: {e}")))?;

        if let Some(err) = parsed.error {
            return Err(BlogCrewError::Llm(format!("OpenRouter API error: {}", err.message)));
        }

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| BlogCrewError::Llm("OpenRouter response has no choices".into()))
    }
}

#[async_trait]
impl ExecutionEngine for OpenRouterEngine {
    #[instrument(skip_all, fields(stage = %task.stage(), model = %self.model))]
    async fn execute(&self, task: &Task) -> Result<String> {
        let agent = task.agent();
        let definitions = self.tool_definitions(agent.tools());
        let tools = (!definitions.is_empty()).then_some(definitions.as_slice());

        let mut messages = vec![
            ChatMessage::text(
                "system",
                format!(
                    "You are a {}.\n\nYour goal: {}\n\n{}",
                    agent.label(),
                    agent.goal(),
                    agent.backstory()
                ),
            ),
            ChatMessage::text(
                "user",
                format!(
                    "{}\n\nExpected output: {}",
                    task.description(),
                    task.expected_output()
                ),
            ),
        ];
        debug!(
            prompt_len = task.description().len(),
            tools = definitions.len(),
            "sending task to model"
        );

        for round in 1..=agent.max_iterations() {
            let reply = self.complete(agent, &messages, tools).await?;
            if reply.tool_calls.is_empty() {
                info!(round, "model answered");
                return final_text(reply);
            }

            debug!(round, calls = reply.tool_calls.len(), "model requested tools");
            let calls = reply.tool_calls.clone();
            messages.push(reply);

            for call in &calls {
                let output = self
                    .tools
                    .invoke(&call.function.name, &call.function.arguments)
                    .await;
                debug!(tool = %call.function.name, output_len = output.len(), "tool returned");
                messages.push(ChatMessage::tool_result(&call.id, output));
            }
        }

        warn!(
            max_iterations = agent.max_iterations(),
            "iteration cap reached, forcing final answer"
        );
        messages.push(ChatMessage::text("user", FINAL_ANSWER_PROMPT));
        let reply = self.complete(agent, &messages, None).await?;
        final_text(reply)
    }
}

fn final_text(message: ChatMessage) -> Result<String> {
    message
        .content
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| BlogCrewError::Llm("model returned an empty completion".into()))
}
