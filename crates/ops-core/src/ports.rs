//! Port traits — the hexagonal architecture boundary.
//!
//! These traits are defined here in `ops-core` (pure Rust).
//! Implementations live in `ops-platform` (native adapters) and in tests.
//! The core never imports platform code; it only depends on these traits.

use std::collections::BTreeMap;

use async_trait::async_trait;
use ops_types::{
    action::{ActionDescriptor, ExecResult},
    message::Message,
    Result,
};

// ─── LLM Port ────────────────────────────────────────────────

/// How the model may use the attached tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolChoice {
    Auto,
    None,
}

impl ToolChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolChoice::Auto => "auto",
            ToolChoice::None => "none",
        }
    }
}

/// Request to send to an LLM
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    /// Empty for the summary turn
    pub tools: Vec<ActionDescriptor>,
    pub tool_choice: Option<ToolChoice>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Complete (non-streaming) response from an LLM
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub message: Message,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[async_trait(?Send)]
pub trait LlmPort {
    /// Non-streaming chat completion
    async fn chat_completion(&self, req: ChatRequest) -> Result<ChatResponse>;
}

// ─── Cluster Port ────────────────────────────────────────────

/// Key-value maps as stored by the control plane
pub type StringMap = BTreeMap<String, String>;

#[async_trait(?Send)]
pub trait ClusterPort {
    /// Data of a config object; `None` when the object carries no data map
    async fn get_config_data(&self, name: &str, namespace: &str) -> Result<Option<StringMap>>;

    async fn patch_config_data(&self, name: &str, namespace: &str, data: &StringMap) -> Result<()>;

    /// Pod-template annotations of a deployment; `None` when absent
    async fn get_template_annotations(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<Option<StringMap>>;

    async fn patch_template_annotations(
        &self,
        name: &str,
        namespace: &str,
        annotations: &StringMap,
    ) -> Result<()>;
}

// ─── Command Port ────────────────────────────────────────────

#[async_trait(?Send)]
pub trait CommandPort {
    /// Run `program` with an argument vector (no shell involved) and
    /// collect its output. A nonzero exit is reported in the result, not as
    /// an error; `Err` means the process could not be run at all.
    async fn run(&self, program: &str, args: &[String]) -> Result<ExecResult>;
}
