//! Message routing for Stage 2 collaboration.
//!
//! Runs once per round, after the barrier: every action request emitted
//! during the round is either turned into a [`Message`] for the next round
//! or dropped as a [`RejectedAction`]. Dropping never affects the rest of
//! the round.

use super::message::{Message, RejectedAction, RejectionReason};
use super::response::AgentResponse;
use crate::action::request::ActionRequest;
use crate::council::registry::AgentRegistry;

/// Messages accepted and requests rejected for one round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingOutcome {
    pub delivered: Vec<Message>,
    pub rejected: Vec<RejectedAction>,
}

/// Validates action requests against the council roster
pub struct MessageRouter<'a> {
    registry: &'a AgentRegistry,
}

impl<'a> MessageRouter<'a> {
    pub fn new(registry: &'a AgentRegistry) -> Self {
        Self { registry }
    }

    /// Route every request of a round, in response order then emission order.
    ///
    /// Failure responses carry no requests and are skipped.
    pub fn route(&self, round_number: usize, responses: &[AgentResponse]) -> RoutingOutcome {
        let mut outcome = RoutingOutcome::default();

        for response in responses.iter().filter(|r| r.is_success()) {
            for request in &response.action_requests {
                match request {
                    ActionRequest::SendMessage { to_agent_id, text } => {
                        let Some(recipient) = self.registry.resolve(to_agent_id) else {
                            outcome.rejected.push(RejectedAction {
                                from_agent_id: response.agent_id.clone(),
                                round_number,
                                request: request.clone(),
                                reason: RejectionReason::InvalidRecipient,
                            });
                            continue;
                        };

                        if text.trim().is_empty() {
                            outcome.rejected.push(RejectedAction {
                                from_agent_id: response.agent_id.clone(),
                                round_number,
                                request: request.clone(),
                                reason: RejectionReason::EmptyMessage,
                            });
                            continue;
                        }

                        outcome.delivered.push(Message {
                            from_agent_id: response.agent_id.clone(),
                            to_agent_id: recipient.id.clone(),
                            round_number,
                            text: text.trim().to_string(),
                        });
                    }
                }
            }
        }

        outcome
    }
}
