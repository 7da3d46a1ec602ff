use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::OpsError;

/// Top-level assistant configuration.
///
/// Every section defaults, so a config file only has to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub llm: LlmConfig,
    pub cluster: ClusterConfig,
    pub limits: LimitsConfig,
    pub system_prompt: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            cluster: ClusterConfig::default(),
            limits: LimitsConfig::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl AssistantConfig {
    pub fn from_json(text: &str) -> Result<Self, OpsError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn validate(&self) -> Result<(), OpsError> {
        if self.llm.api_key.trim().is_empty() {
            return Err(OpsError::Config("missing API key".to_string()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(OpsError::Config("model name is empty".to_string()));
        }
        if self.llm.provider == LlmProvider::Custom && self.llm.api_base.is_none() {
            return Err(OpsError::Config(
                "the custom provider needs an api_base".to_string(),
            ));
        }
        if self.cluster.namespace.trim().is_empty() {
            return Err(OpsError::Config("namespace is empty".to_string()));
        }
        if self.limits.model_timeout_ms == 0 || self.limits.action_timeout_ms == 0 {
            return Err(OpsError::Config("timeouts must be non-zero".to_string()));
        }
        if self.limits.max_concurrent_actions == 0 {
            return Err(OpsError::Config(
                "max_concurrent_actions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub api_key: String,
    pub api_base: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            model: "gpt-4o".to_string(),
            api_key: String::new(),
            api_base: None,
            max_tokens: 1024,
            temperature: 0.2,
        }
    }
}

impl LlmConfig {
    pub fn base_url(&self) -> String {
        self.api_base
            .clone()
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LlmProvider {
    OpenAI,
    DeepSeek,
    Custom,
}

impl LlmProvider {
    pub fn default_base_url(&self) -> &str {
        match self {
            LlmProvider::OpenAI => "https://api.openai.com/v1",
            LlmProvider::DeepSeek => "https://api.deepseek.com/v1",
            LlmProvider::Custom => "",
        }
    }

    pub fn all() -> &'static [LlmProvider] {
        &[LlmProvider::OpenAI, LlmProvider::DeepSeek, LlmProvider::Custom]
    }

    pub fn label(&self) -> &str {
        match self {
            LlmProvider::OpenAI => "OpenAI",
            LlmProvider::DeepSeek => "DeepSeek",
            LlmProvider::Custom => "Custom",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|p| p.label().eq_ignore_ascii_case(label))
    }
}

/// How to reach the control plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Use the service-account credentials of the pod we run in
    pub in_cluster: bool,
    /// Explicit kubeconfig; the default lookup applies when unset
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context; the current context applies when unset
    pub context: Option<String>,
    pub namespace: String,
    /// kubectl binary used to create resources
    pub kubectl: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            in_cluster: false,
            kubeconfig: None,
            context: None,
            namespace: "default".to_string(),
            kubectl: "kubectl".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub model_timeout_ms: u64,
    pub action_timeout_ms: u64,
    /// 1 runs proposed calls strictly one after another
    pub max_concurrent_actions: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            model_timeout_ms: 60_000,
            action_timeout_ms: 30_000,
            max_concurrent_actions: 1,
        }
    }
}

impl LimitsConfig {
    pub fn model_timeout(&self) -> Duration {
        Duration::from_millis(self.model_timeout_ms)
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an operations expert for a Kubernetes cluster.
Analyze the user's request and choose the appropriate function to carry out the task.

Available functions:
- modify_config: update one key of a service's ConfigMap
- restart_service: trigger a rolling restart of a Deployment
- apply_manifest: create a new resource from a container image

If no function fits, answer in plain language without calling one.
"#;
