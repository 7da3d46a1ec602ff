//! Command-line flags. Every flag overrides the matching config-file value.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use ops_types::{
    config::{AssistantConfig, LlmProvider},
    OpsError,
};

#[derive(Parser, Debug, Default)]
#[command(
    name = "kube-ops",
    version,
    about = "Natural-language operations assistant for a Kubernetes cluster"
)]
pub struct Args {
    /// JSON config file
    #[arg(long, env = "KUBE_OPS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Model provider: OpenAI, DeepSeek or Custom
    #[arg(long, env = "KUBE_OPS_PROVIDER")]
    pub provider: Option<String>,

    #[arg(long, env = "KUBE_OPS_MODEL")]
    pub model: Option<String>,

    /// Base URL of an OpenAI-compatible endpoint
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub api_base: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Kubeconfig context to use
    #[arg(long)]
    pub context: Option<String>,

    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Use the pod's service account instead of a kubeconfig
    #[arg(long)]
    pub in_cluster: bool,

    #[arg(short, long)]
    pub namespace: Option<String>,

    /// kubectl binary used by apply_manifest
    #[arg(long)]
    pub kubectl: Option<String>,

    #[arg(long)]
    pub model_timeout_secs: Option<u64>,

    #[arg(long)]
    pub action_timeout_secs: Option<u64>,

    /// How many proposed calls of one turn may run at once
    #[arg(long)]
    pub max_concurrent_actions: Option<usize>,

    /// Answer a single instruction and exit
    #[arg(short, long)]
    pub query: Option<String>,

    /// -v for info, -vv for debug logging
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn apply(&self, config: &mut AssistantConfig) -> Result<(), OpsError> {
        if let Some(label) = &self.provider {
            config.llm.provider = LlmProvider::from_label(label)
                .ok_or_else(|| OpsError::Config(format!("unknown provider: {}", label)))?;
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(base) = &self.api_base {
            config.llm.api_base = Some(base.clone());
        }
        if let Some(key) = &self.api_key {
            config.llm.api_key = key.clone();
        }
        if let Some(context) = &self.context {
            config.cluster.context = Some(context.clone());
        }
        if let Some(path) = &self.kubeconfig {
            config.cluster.kubeconfig = Some(path.clone());
        }
        if self.in_cluster {
            config.cluster.in_cluster = true;
        }
        if let Some(ns) = &self.namespace {
            config.cluster.namespace = ns.clone();
        }
        if let Some(kubectl) = &self.kubectl {
            config.cluster.kubectl = kubectl.clone();
        }
        if let Some(secs) = self.model_timeout_secs {
            config.limits.model_timeout_ms = secs.saturating_mul(1000);
        }
        if let Some(secs) = self.action_timeout_secs {
            config.limits.action_timeout_ms = secs.saturating_mul(1000);
        }
        if let Some(n) = self.max_concurrent_actions {
            config.limits.max_concurrent_actions = n;
        }
        Ok(())
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
