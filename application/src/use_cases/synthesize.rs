//! Stage 4: final synthesis by the chairman

use crate::ports::model_gateway::ModelGateway;
use crate::use_cases::collect_rankings::PeerRankingOutcome;
use crate::use_cases::fan_out::{AgentQuery, fan_out};
use crate::use_cases::shared::{Cancelled, TurnContext, attributed};
use council_domain::{
    AgentRegistry, AgentResponse, ChatMessage, CollaborationRound, CouncilPromptTemplate, Stage,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Why the synthesizer produced no answer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    #[error("{0}")]
    Failed(String),
}

/// Issues the single synthesizer query with the full turn context
pub struct SynthesisStage<G: ModelGateway + 'static> {
    gateway: Arc<G>,
    registry: Arc<AgentRegistry>,
    timeout: Duration,
}

impl<G: ModelGateway + 'static> SynthesisStage<G> {
    pub fn new(gateway: Arc<G>, registry: Arc<AgentRegistry>, timeout: Duration) -> Self {
        Self {
            gateway,
            registry,
            timeout,
        }
    }

    /// Build the synthesizer prompt from everything the turn produced
    pub fn prompt(
        &self,
        question: &str,
        stage1: &[AgentResponse],
        transcript: &[CollaborationRound],
        ranking: &PeerRankingOutcome,
    ) -> String {
        let registry = &self.registry;
        let name_of = |id: &council_domain::AgentId| registry.display_name(id).to_string();

        let responses = attributed(registry.members(), stage1, true);
        let rendered = CouncilPromptTemplate::transcript(transcript, name_of);

        let aggregate: Vec<(String, f64, usize)> = ranking
            .stage
            .aggregate
            .iter()
            .map(|e| (name_of(&e.agent_id), e.average_position, e.vote_count))
            .collect();

        let evaluations: Vec<(String, String)> = ranking
            .stage
            .rankings
            .iter()
            .filter(|r| r.error.is_none())
            .map(|r| {
                (
                    name_of(&r.evaluator_agent_id),
                    ranking.map.deanonymize_text(&r.raw_text, name_of),
                )
            })
            .collect();

        CouncilPromptTemplate::synthesis_prompt(
            question,
            &responses,
            &rendered,
            &aggregate,
            &evaluations,
        )
    }

    pub async fn run(
        &self,
        ctx: &mut TurnContext<'_>,
        stage1: &[AgentResponse],
        transcript: &[CollaborationRound],
        ranking: &PeerRankingOutcome,
    ) -> Result<AgentResponse, SynthesisError> {
        let stage = Stage::Synthesis;
        let synthesizer = self.registry.synthesizer();
        info!("{} by {}", stage, synthesizer.id);
        ctx.progress.on_stage_start(&stage, 1);

        let prompt = self.prompt(ctx.question.content(), stage1, transcript, ranking);
        let query = AgentQuery::new(synthesizer.clone(), vec![ChatMessage::user(prompt)]);

        let outcome = fan_out(
            &self.gateway,
            stage,
            vec![query],
            self.timeout,
            &ctx.cancel,
            ctx.progress,
        )
        .await?
        .into_iter()
        .next()
        .unwrap_or_else(|| Err("no synthesizer result".to_string()));

        ctx.progress.on_stage_complete(&stage);

        match outcome {
            Ok(reply) if !reply.text.trim().is_empty() => {
                Ok(AgentResponse::success(synthesizer.id.clone(), reply.text))
            }
            Ok(_) => Err(SynthesisError::Failed("empty synthesis".to_string())),
            Err(reason) => Err(SynthesisError::Failed(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoProgress;
    use crate::use_cases::testing::{ScriptedGateway, id, registry};
    use council_domain::{
        AggregateEntry, AnonymizationMap, Message, Question, RankingStage, parse_ranking,
    };
    use tokio_util::sync::CancellationToken;

    fn fixture() -> (Vec<AgentResponse>, Vec<CollaborationRound>, PeerRankingOutcome) {
        let stage1 = vec![
            AgentResponse::success(id("alice"), "alice-answer"),
            AgentResponse::failure(id("bob"), "Timeout"),
            AgentResponse::success(id("charlie"), "charlie-answer"),
        ];
        let transcript = vec![CollaborationRound {
            round_number: 1,
            responses: vec![AgentResponse::success(id("alice"), "alice-remark")],
            deliveries: vec![Message {
                from_agent_id: id("alice"),
                to_agent_id: id("charlie"),
                round_number: 1,
                text: "alice-to-charlie".to_string(),
            }],
            rejected: vec![],
        }];
        let map = AnonymizationMap::new([id("alice"), id("charlie")]).unwrap();
        let ranking = parse_ranking(
            id("charlie"),
            "Response B is sharper.\nFINAL RANKING:\n1. Response B\n2. Response A",
            &map,
        );
        let outcome = PeerRankingOutcome {
            stage: RankingStage {
                rankings: vec![ranking],
                aggregate: vec![
                    AggregateEntry {
                        agent_id: id("charlie"),
                        average_position: 1.0,
                        vote_count: 1,
                    },
                    AggregateEntry {
                        agent_id: id("alice"),
                        average_position: 2.0,
                        vote_count: 1,
                    },
                ],
            },
            map,
        };
        (stage1, transcript, outcome)
    }

    #[tokio::test]
    async fn test_synthesizer_sees_full_deanonymized_context() {
        let gateway = Arc::new(ScriptedGateway::new().reply("chairman", "The final answer."));
        let stage = SynthesisStage::new(
            gateway.clone(),
            Arc::new(registry(&["alice", "bob", "charlie"])),
            Duration::from_secs(5),
        );
        let (stage1, transcript, ranking) = fixture();

        let progress = NoProgress;
        let mut ctx = TurnContext::new(
            Question::new("What is Rust?").unwrap(),
            CancellationToken::new(),
            &progress,
        );
        let response = stage.run(&mut ctx, &stage1, &transcript, &ranking).await.unwrap();
        assert_eq!(response.agent_id, id("chairman"));
        assert_eq!(response.text, "The final answer.");

        let prompt = gateway.calls_for("chairman")[0].context();
        assert!(prompt.contains("Alice (Member):\nalice-answer"));
        assert!(prompt.contains("Bob (Member):\n[no response: Timeout]"));
        assert!(prompt.contains("Alice: alice-remark"));
        assert!(prompt.contains("Alice -> Charlie: alice-to-charlie"));
        assert!(prompt.contains("1. Charlie (average position 1.00, 1 vote)"));
        assert!(prompt.contains("Response B (Charlie) is sharper."));
        assert!(prompt.contains("1. Response B (Charlie)\n2. Response A (Alice)"));
    }

    #[tokio::test]
    async fn test_failure_is_reported() {
        let gateway = Arc::new(ScriptedGateway::new().fail("chairman", "model unloaded"));
        let stage = SynthesisStage::new(
            gateway,
            Arc::new(registry(&["alice", "bob", "charlie"])),
            Duration::from_secs(5),
        );
        let (stage1, transcript, ranking) = fixture();

        let progress = NoProgress;
        let mut ctx = TurnContext::new(
            Question::new("What is Rust?").unwrap(),
            CancellationToken::new(),
            &progress,
        );
        let err = stage
            .run(&mut ctx, &stage1, &transcript, &ranking)
            .await
            .unwrap_err();
        assert!(matches!(err, SynthesisError::Failed(reason) if reason.contains("model unloaded")));
    }

    #[tokio::test]
    async fn test_empty_synthesis_is_a_failure() {
        let gateway = Arc::new(ScriptedGateway::new().reply("chairman", "   "));
        let stage = SynthesisStage::new(
            gateway,
            Arc::new(registry(&["alice"])),
            Duration::from_secs(5),
        );
        let progress = NoProgress;
        let mut ctx = TurnContext::new(
            Question::new("Why?").unwrap(),
            CancellationToken::new(),
            &progress,
        );
        let ranking = PeerRankingOutcome {
            stage: RankingStage::default(),
            map: AnonymizationMap::default(),
        };
        let err = stage
            .run(&mut ctx, &[AgentResponse::success(id("alice"), "x")], &[], &ranking)
            .await
            .unwrap_err();
        assert_eq!(err, SynthesisError::Failed("empty synthesis".to_string()));
    }
}
