//! The fixed catalog of cluster actions.
//!
//! Descriptors follow the OpenAI function-calling schema so they work across
//! providers. Decoding a proposed call yields a closed [`Action`] enum; the
//! executor matches on it exhaustively.

use ops_types::{
    action::{ActionDescriptor, ActionParameters},
    message::ProposedCall,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::dispatch::DispatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    ModifyConfig,
    RestartService,
    ApplyManifest,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [
        ActionKind::ModifyConfig,
        ActionKind::RestartService,
        ActionKind::ApplyManifest,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::ModifyConfig => "modify_config",
            ActionKind::RestartService => "restart_service",
            ActionKind::ApplyManifest => "apply_manifest",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn descriptor(&self) -> ActionDescriptor {
        match self {
            ActionKind::ModifyConfig => ActionDescriptor {
                name: self.name().to_string(),
                description: "Modify the configuration of a service in Kubernetes by updating \
                    the value of one key in its ConfigMap. ConfigMaps are usually named \
                    '<service>-config'. Call restart_service afterwards so the service \
                    picks up the change."
                    .to_string(),
                parameters: ActionParameters::object()
                    .string(
                        "service_name",
                        "Name of the service's ConfigMap, e.g. gateway-config for the gateway service",
                        true,
                    )
                    .string("key", "Configuration key", true)
                    .string("value", "Configuration value", true),
            },
            ActionKind::RestartService => ActionDescriptor {
                name: self.name().to_string(),
                description: "Restart a service with a rolling restart of its Deployment".to_string(),
                parameters: ActionParameters::object().string(
                    "service_name",
                    "Name of the Deployment in Kubernetes, e.g. gateway",
                    true,
                ),
            },
            ActionKind::ApplyManifest => ActionDescriptor {
                name: self.name().to_string(),
                description: "Deploy a new service from a container image".to_string(),
                parameters: ActionParameters::object()
                    .string(
                        "resource_type",
                        "Kubernetes resource type, e.g. deployment",
                        true,
                    )
                    .string("image", "Container image of the service, e.g. nginx", true),
            },
        }
    }
}

/// Read-only view of the actions offered to the model
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionCatalog;

impl ActionCatalog {
    pub fn new() -> Self {
        Self
    }

    /// Descriptors in declaration order
    pub fn descriptors(&self) -> Vec<ActionDescriptor> {
        ActionKind::ALL.iter().map(|k| k.descriptor()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModifyConfigArgs {
    pub service_name: String,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RestartServiceArgs {
    pub service_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApplyManifestArgs {
    pub resource_type: String,
    pub image: String,
}

/// A decoded, typed action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ModifyConfig(ModifyConfigArgs),
    RestartService(RestartServiceArgs),
    ApplyManifest(ApplyManifestArgs),
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::ModifyConfig(_) => ActionKind::ModifyConfig,
            Action::RestartService(_) => ActionKind::RestartService,
            Action::ApplyManifest(_) => ActionKind::ApplyManifest,
        }
    }

    /// Resolve the name, then parse the raw arguments, then bind them to the
    /// action's typed parameters. Every error names the action.
    pub fn decode(call: &ProposedCall) -> Result<Action, DispatchError> {
        let kind = ActionKind::from_name(call.action_name())
            .ok_or_else(|| DispatchError::UnknownAction(call.action_name().to_string()))?;
        let args = parse_call_args(&call.function.arguments).map_err(|e| {
            DispatchError::Decode(format!("invalid arguments for {}: {}", kind.name(), e))
        })?;
        let args = Value::Object(args);

        let action = match kind {
            ActionKind::ModifyConfig => Action::ModifyConfig(bind(kind, args)?),
            ActionKind::RestartService => Action::RestartService(bind(kind, args)?),
            ActionKind::ApplyManifest => Action::ApplyManifest(bind(kind, args)?),
        };
        Ok(action)
    }
}

fn bind<T: serde::de::DeserializeOwned>(kind: ActionKind, args: Value) -> Result<T, DispatchError> {
    serde_json::from_value(args)
        .map_err(|e| DispatchError::Decode(format!("invalid arguments for {}: {}", kind.name(), e)))
}

/// Parse a JSON arguments string into an object map.
///
/// Models sometimes send an empty string for a call without arguments;
/// that is read as `{}`.
pub fn parse_call_args(args: &str) -> Result<Map<String, Value>, DispatchError> {
    if args.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(args) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DispatchError::Decode(format!(
            "arguments must be a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(DispatchError::Decode(format!("malformed arguments: {}", e))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
