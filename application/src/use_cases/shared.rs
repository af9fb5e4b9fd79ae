//! Per-turn state shared by the stage use cases.

use crate::ports::progress::ProgressNotifier;
use council_domain::{Agent, AgentResponse, Question, TurnWarning};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// The turn was cancelled before the stage finished
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Turn cancelled")]
pub struct Cancelled;

/// Explicit context threaded through every stage of one turn
///
/// Holds the question, the turn's cancellation token and the warnings
/// collected so far. Nothing in here outlives the turn.
pub struct TurnContext<'a> {
    pub question: Question,
    pub cancel: CancellationToken,
    pub progress: &'a dyn ProgressNotifier,
    warnings: Vec<TurnWarning>,
}

impl<'a> TurnContext<'a> {
    pub fn new(
        question: Question,
        cancel: CancellationToken,
        progress: &'a dyn ProgressNotifier,
    ) -> Self {
        Self {
            question,
            cancel,
            progress,
            warnings: Vec::new(),
        }
    }

    /// Record a non-fatal degradation
    pub fn warn(&mut self, warning: TurnWarning) {
        warn!("{}", warning);
        self.progress.on_warning(&warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[TurnWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<TurnWarning> {
        std::mem::take(&mut self.warnings)
    }
}

/// `(attribution, text)` pairs for prompts, one per response in order.
///
/// Failed responses are kept as explicit markers when `keep_failures` is set.
pub(crate) fn attributed(
    members: &[Agent],
    responses: &[AgentResponse],
    keep_failures: bool,
) -> Vec<(String, String)> {
    responses
        .iter()
        .filter_map(|response| {
            let who = members
                .iter()
                .find(|a| a.id == response.agent_id)
                .map(Agent::attribution)
                .unwrap_or_else(|| response.agent_id.to_string());
            match (response.is_success(), keep_failures) {
                (true, _) => Some((who, response.text.clone())),
                (false, true) => Some((
                    who,
                    format!(
                        "[no response: {}]",
                        response.error.as_deref().unwrap_or("unknown error")
                    ),
                )),
                (false, false) => None,
            }
        })
        .collect()
}
