//! Action executor — performs the side-effecting cluster calls.
//!
//! `invoke` always yields an [`ActionOutcome`]; control-plane and process
//! errors become `Failure` data here and never travel further up.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use log::{info, warn};
use ops_types::{action::ActionOutcome, config::AssistantConfig, OpsError, Result};
use serde_json::{json, Map, Value};

use crate::catalog::{Action, ApplyManifestArgs, ModifyConfigArgs, RestartServiceArgs};
use crate::dispatch::DispatchError;
use crate::ports::{ClusterPort, CommandPort};

/// Pod-template annotation kubectl itself uses for `rollout restart`
pub const RESTARTED_AT_ANNOTATION: &str = "kubectl.kubernetes.io/restartedAt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorSettings {
    pub namespace: String,
    pub kubectl: String,
    pub kube_context: Option<String>,
    pub action_timeout: Duration,
}

impl ExecutorSettings {
    pub fn from_config(config: &AssistantConfig) -> Self {
        Self {
            namespace: config.cluster.namespace.clone(),
            kubectl: config.cluster.kubectl.clone(),
            kube_context: config.cluster.context.clone(),
            action_timeout: config.limits.action_timeout(),
        }
    }
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self::from_config(&AssistantConfig::default())
    }
}

pub struct ActionExecutor<'a> {
    cluster: &'a dyn ClusterPort,
    commands: &'a dyn CommandPort,
    settings: ExecutorSettings,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(
        cluster: &'a dyn ClusterPort,
        commands: &'a dyn CommandPort,
        settings: ExecutorSettings,
    ) -> Self {
        Self { cluster, commands, settings }
    }

    /// Run one action under the configured deadline.
    pub async fn invoke(&self, action: &Action) -> ActionOutcome {
        let name = action.kind().name();
        let limit = self.settings.action_timeout;

        let result = match tokio::time::timeout(limit, self.execute(action)).await {
            Ok(result) => result,
            Err(_) => Err(OpsError::Timeout(limit.as_millis() as u64)),
        };

        match result {
            Ok(payload) => {
                info!("{} succeeded", name);
                ActionOutcome::Success(payload)
            }
            Err(e) => {
                warn!("{} failed: {}", name, e);
                DispatchError::Execution(e.to_string()).into()
            }
        }
    }

    async fn execute(&self, action: &Action) -> Result<Map<String, Value>> {
        match action {
            Action::ModifyConfig(args) => self.modify_config(args).await,
            Action::RestartService(args) => self.restart_service(args).await,
            Action::ApplyManifest(args) => self.apply_manifest(args).await,
        }
    }

    async fn modify_config(&self, args: &ModifyConfigArgs) -> Result<Map<String, Value>> {
        let ns = &self.settings.namespace;
        let mut data = self
            .cluster
            .get_config_data(&args.service_name, ns)
            .await?
            .unwrap_or_default();
        data.insert(args.key.clone(), args.value.clone());
        self.cluster
            .patch_config_data(&args.service_name, ns, &data)
            .await?;
        info!("ConfigMap '{}' updated: {}={}", args.service_name, args.key, args.value);

        Ok(payload(json!({
            "service_name": args.service_name,
            "key": args.key,
            "value": args.value,
        })))
    }

    async fn restart_service(&self, args: &RestartServiceArgs) -> Result<Map<String, Value>> {
        let ns = &self.settings.namespace;
        let mut annotations = self
            .cluster
            .get_template_annotations(&args.service_name, ns)
            .await?
            .unwrap_or_default();
        annotations.insert(
            RESTARTED_AT_ANNOTATION.to_string(),
            restart_timestamp(Utc::now()),
        );
        self.cluster
            .patch_template_annotations(&args.service_name, ns, &annotations)
            .await?;
        info!("Deployment '{}' restart requested", args.service_name);

        Ok(payload(json!({
            "service_name": args.service_name,
            "action": "restart",
        })))
    }

    async fn apply_manifest(&self, args: &ApplyManifestArgs) -> Result<Map<String, Value>> {
        let name = manifest_resource_name(&args.image, &args.resource_type);
        let argv = self.create_args(&args.resource_type, &name, &args.image);
        let exec = self.commands.run(&self.settings.kubectl, &argv).await?;

        if !exec.success() {
            let detail = if exec.stderr.trim().is_empty() {
                exec.stdout.trim()
            } else {
                exec.stderr.trim()
            };
            return Err(OpsError::Command(format!(
                "{} exited with status {}: {}",
                self.settings.kubectl, exec.exit_code, detail
            )));
        }
        info!("{} '{}' created", args.resource_type, name);

        Ok(payload(json!({
            "resource_type": args.resource_type,
            "image": args.image,
            "result": exec.stdout,
        })))
    }

    /// Argument vector for `kubectl create`; values are never interpolated
    /// into a shell string.
    pub fn create_args(&self, resource_type: &str, name: &str, image: &str) -> Vec<String> {
        let mut argv = Vec::with_capacity(8);
        if let Some(ctx) = &self.settings.kube_context {
            argv.push("--context".to_string());
            argv.push(ctx.clone());
        }
        argv.push("create".to_string());
        argv.push(resource_type.to_string());
        argv.push(name.to_string());
        argv.push(format!("--image={}", image));
        argv.push("--namespace".to_string());
        argv.push(self.settings.namespace.clone());
        argv
    }
}

/// Name given to resources created by `apply_manifest`
pub fn manifest_resource_name(image: &str, resource_type: &str) -> String {
    format!("{}-{}", image, resource_type)
}

/// RFC 3339, whole seconds, single `Z` suffix: `2026-10-17T09:30:00Z`
pub fn restart_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn payload(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
