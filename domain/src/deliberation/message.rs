//! Routed messages and rejected actions

use crate::action::request::ActionRequest;
use crate::council::agent::AgentId;
use serde::{Deserialize, Serialize};

/// A message between two council members
///
/// Only created by the [`MessageRouter`](super::router::MessageRouter)
/// after the recipient has been validated. `round_number` is the round the
/// message was emitted in; it becomes visible from the following round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub from_agent_id: AgentId,
    pub to_agent_id: AgentId,
    pub round_number: usize,
    pub text: String,
}

/// Why an action request was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// Addressed to an agent that is not on the council
    InvalidRecipient,
    /// Message body was blank
    EmptyMessage,
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::InvalidRecipient => write!(f, "invalid recipient"),
            RejectionReason::EmptyMessage => write!(f, "empty message"),
        }
    }
}

/// An action request the router refused to deliver, kept for audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedAction {
    pub from_agent_id: AgentId,
    pub round_number: usize,
    pub request: ActionRequest,
    pub reason: RejectionReason,
}
