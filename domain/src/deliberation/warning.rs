//! Non-fatal degradations recorded during a turn

use super::stage::Stage;
use crate::council::agent::AgentId;
use serde::{Deserialize, Serialize};

/// A failure the turn recovered from locally
///
/// Recorded in the turn metadata so callers can show explicit failure
/// markers instead of silently missing output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnWarning {
    /// An agent's query failed or timed out; its slot holds a failure marker
    AgentQueryFailure {
        stage: Stage,
        #[serde(skip_serializing_if = "Option::is_none")]
        round: Option<usize>,
        agent_id: AgentId,
        reason: String,
    },
    /// A message was addressed to an agent that is not on the council
    InvalidRecipient {
        round: usize,
        from: AgentId,
        to: String,
    },
    /// A model invoked an unknown action or omitted required arguments
    MalformedAction {
        round: usize,
        from: AgentId,
        reason: String,
    },
    /// No ranking could be extracted from an evaluation
    RankingParseFailure { evaluator: AgentId },
}

impl std::fmt::Display for TurnWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnWarning::AgentQueryFailure {
                stage,
                round: Some(round),
                agent_id,
                reason,
            } => write!(f, "{} round {}: {} failed: {}", stage, round, agent_id, reason),
            TurnWarning::AgentQueryFailure {
                stage,
                round: None,
                agent_id,
                reason,
            } => write!(f, "{}: {} failed: {}", stage, agent_id, reason),
            TurnWarning::InvalidRecipient { round, from, to } => write!(
                f,
                "round {}: message from {} to unknown member '{}' dropped",
                round, from, to
            ),
            TurnWarning::MalformedAction {
                round,
                from,
                reason,
            } => write!(f, "round {}: action from {} ignored: {}", round, from, reason),
            TurnWarning::RankingParseFailure { evaluator } => {
                write!(f, "no ranking found in evaluation by {}", evaluator)
            }
        }
    }
}
