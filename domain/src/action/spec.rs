//! Action declarations and raw invocations

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Name of the only action council members can invoke
pub const SEND_MESSAGE: &str = "send_message";

/// Declaration of an action a model may invoke
///
/// `parameters` is a JSON Schema object, handed to the model as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ActionSpec {
    /// The `send_message` action, listing the names peers can be addressed by
    pub fn send_message<S: AsRef<str>>(member_names: &[S]) -> Self {
        let names = member_names
            .iter()
            .map(|n| format!("'{}'", n.as_ref()))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            name: SEND_MESSAGE.to_string(),
            description: "Send a message to another council member to share insights or ask for their perspective".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "to_member": {
                        "type": "string",
                        "description": format!(
                            "Name of the council member to send the message to (one of: {})",
                            names
                        ),
                    },
                    "message": {
                        "type": "string",
                        "description": "The message content - share an insight, ask a question, or build on their response",
                    },
                },
                "required": ["to_member", "message"],
            }),
        }
    }
}

/// A raw action invocation as returned by a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionInvocation {
    /// Provider-assigned call id, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub arguments: Value,
}

impl ActionInvocation {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: None,
            name: name.into(),
            arguments,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}
