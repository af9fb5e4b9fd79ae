//! Agent response value object

use crate::action::request::ActionRequest;
use crate::council::agent::AgentId;
use serde::{Deserialize, Serialize};

/// Result of one query to one agent
///
/// Failure responses keep the agent's slot in the stage output but carry
/// no text and no action requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub agent_id: AgentId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub action_requests: Vec<ActionRequest>,
    pub is_failure: bool,
    /// Why the query failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentResponse {
    pub fn success(agent_id: AgentId, text: impl Into<String>) -> Self {
        Self {
            agent_id,
            text: text.into(),
            action_requests: Vec::new(),
            is_failure: false,
            error: None,
        }
    }

    pub fn failure(agent_id: AgentId, error: impl Into<String>) -> Self {
        Self {
            agent_id,
            text: String::new(),
            action_requests: Vec::new(),
            is_failure: true,
            error: Some(error.into()),
        }
    }

    pub fn with_actions(mut self, actions: Vec<ActionRequest>) -> Self {
        if !self.is_failure {
            self.action_requests = actions;
        }
        self
    }

    pub fn is_success(&self) -> bool {
        !self.is_failure
    }

    /// Trimmed text, `None` for failures and empty remarks
    pub fn remark(&self) -> Option<&str> {
        if self.is_failure {
            return None;
        }
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }
}
