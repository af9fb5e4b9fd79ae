//! Stage 1: individual responses
//!
//! Every member answers the question on its own, in parallel.

use crate::ports::model_gateway::ModelGateway;
use crate::use_cases::fan_out::{AgentQuery, fan_out};
use crate::use_cases::shared::{Cancelled, TurnContext};
use council_domain::{AgentRegistry, AgentResponse, ChatMessage, CouncilPromptTemplate, Stage, TurnWarning};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Queries every member once and returns one response per member
pub struct ResponseCollector<G: ModelGateway + 'static> {
    gateway: Arc<G>,
    registry: Arc<AgentRegistry>,
    timeout: Duration,
}

impl<G: ModelGateway + 'static> ResponseCollector<G> {
    pub fn new(gateway: Arc<G>, registry: Arc<AgentRegistry>, timeout: Duration) -> Self {
        Self {
            gateway,
            registry,
            timeout,
        }
    }

    /// Collect responses in registry order.
    ///
    /// A failed or timed-out member gets a failure response in its slot.
    /// Whether the stage as a whole is usable is the caller's decision.
    pub async fn collect(&self, ctx: &mut TurnContext<'_>) -> Result<Vec<AgentResponse>, Cancelled> {
        let stage = Stage::Responses;
        info!("{}", stage);
        ctx.progress.on_stage_start(&stage, self.registry.len());

        let prompt = CouncilPromptTemplate::initial_query(ctx.question.content());
        let queries = self
            .registry
            .members()
            .iter()
            .map(|agent| {
                AgentQuery::new(
                    agent.clone(),
                    vec![
                        ChatMessage::system(CouncilPromptTemplate::member_system(agent)),
                        ChatMessage::user(prompt.clone()),
                    ],
                )
            })
            .collect();

        let outcomes = fan_out(
            &self.gateway,
            stage,
            queries,
            self.timeout,
            &ctx.cancel,
            ctx.progress,
        )
        .await?;

        let mut responses = Vec::with_capacity(outcomes.len());
        for (agent, outcome) in self.registry.members().iter().zip(outcomes) {
            match outcome {
                Ok(reply) => responses.push(AgentResponse::success(agent.id.clone(), reply.text)),
                Err(reason) => {
                    ctx.warn(TurnWarning::AgentQueryFailure {
                        stage,
                        round: None,
                        agent_id: agent.id.clone(),
                        reason: reason.clone(),
                    });
                    responses.push(AgentResponse::failure(agent.id.clone(), reason));
                }
            }
        }

        info!(
            "{} of {} members responded",
            responses.iter().filter(|r| r.is_success()).count(),
            responses.len()
        );
        ctx.progress.on_stage_complete(&stage);
        Ok(responses)
    }
}
