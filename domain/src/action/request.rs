//! Typed action requests

use super::spec::{ActionInvocation, SEND_MESSAGE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an invocation could not be turned into an [`ActionRequest`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionDecodeError {
    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("missing argument '{argument}' for {action}")]
    MissingArgument {
        action: &'static str,
        argument: &'static str,
    },
}

/// An action emitted by a council member during collaboration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionRequest {
    /// Address a message to another member, delivered at the round boundary
    SendMessage {
        /// Recipient as written by the model: an id or a display name
        to_agent_id: String,
        text: String,
    },
}

impl ActionRequest {
    pub fn send_message(to: impl Into<String>, text: impl Into<String>) -> Self {
        ActionRequest::SendMessage {
            to_agent_id: to.into(),
            text: text.into(),
        }
    }
}

impl TryFrom<&ActionInvocation> for ActionRequest {
    type Error = ActionDecodeError;

    fn try_from(invocation: &ActionInvocation) -> Result<Self, Self::Error> {
        match invocation.name.as_str() {
            SEND_MESSAGE => {
                let to = invocation
                    .get_string("to_member")
                    .or_else(|| invocation.get_string("to"))
                    .filter(|s| !s.trim().is_empty())
                    .ok_or(ActionDecodeError::MissingArgument {
                        action: SEND_MESSAGE,
                        argument: "to_member",
                    })?;
                let text = invocation
                    .get_string("message")
                    .ok_or(ActionDecodeError::MissingArgument {
                        action: SEND_MESSAGE,
                        argument: "message",
                    })?;
                Ok(ActionRequest::send_message(to.trim(), text))
            }
            other => Err(ActionDecodeError::UnknownAction(other.to_string())),
        }
    }
}
