use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Declaration of an action the model may call.
/// Follows the OpenAI function-calling schema for broad provider compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: ActionParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionParameters {
    #[serde(rename = "type")]
    pub schema_type: String, // always "object"
    pub properties: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub required: Vec<String>,
}

impl ActionParameters {
    pub fn object() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: Map::new(),
            required: Vec::new(),
        }
    }

    /// Append a string-typed parameter. Insertion order is kept in the schema.
    pub fn string(mut self, name: &str, description: &str, required: bool) -> Self {
        self.properties.insert(
            name.to_string(),
            json!({
                "type": "string",
                "description": description,
            }),
        );
        if required {
            self.required.push(name.to_string());
        }
        self
    }
}

/// Outcome of one proposed call. Exactly one is produced per call,
/// whichever stage failed.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Success(Map<String, Value>),
    Failure(String),
}

impl ActionOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        ActionOutcome::Failure(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Success(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ActionOutcome::Success(_) => None,
            ActionOutcome::Failure(msg) => Some(msg),
        }
    }

    /// Tool-message content: the success payload, or `{"error": message}`.
    pub fn content(&self) -> String {
        let value = match self {
            ActionOutcome::Success(payload) => Value::Object(payload.clone()),
            ActionOutcome::Failure(msg) => json!({ "error": msg }),
        };
        value.to_string()
    }
}

/// External command execution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
