//! Stage 3: anonymized peer ranking
//!
//! Members with a successful Stage 1 answer are hidden behind labels
//! ("Response A", "Response B", ...). Every member then evaluates all
//! labeled answers in parallel; evaluations are parsed into rankings and
//! the valid ones aggregated into a consensus order.

use crate::ports::model_gateway::ModelGateway;
use crate::use_cases::fan_out::{AgentQuery, fan_out};
use crate::use_cases::shared::{Cancelled, TurnContext};
use council_domain::{
    AgentRegistry, AgentResponse, AnonymizationMap, ChatMessage, CollaborationRound,
    CouncilPromptTemplate, DomainError, LabelOrder, Ranking, RankingStage, Stage, TurnWarning,
    aggregate_rankings, parse_ranking,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Stage 3 output plus the label map it was computed under
#[derive(Debug, Clone)]
pub struct PeerRankingOutcome {
    pub stage: RankingStage,
    pub map: AnonymizationMap,
}

/// Runs anonymized peer evaluation over the Stage 1 answers
pub struct PeerRankingStage<G: ModelGateway + 'static> {
    gateway: Arc<G>,
    registry: Arc<AgentRegistry>,
    timeout: Duration,
    label_order: LabelOrder,
    label_seed: Option<u64>,
    include_transcript: bool,
}

impl<G: ModelGateway + 'static> PeerRankingStage<G> {
    pub fn new(gateway: Arc<G>, registry: Arc<AgentRegistry>, timeout: Duration) -> Self {
        Self {
            gateway,
            registry,
            timeout,
            label_order: LabelOrder::default(),
            label_seed: None,
            include_transcript: false,
        }
    }

    pub fn with_label_order(mut self, order: LabelOrder, seed: Option<u64>) -> Self {
        self.label_order = order;
        self.label_seed = seed;
        self
    }

    /// Show evaluators the collaboration transcript, with names replaced by labels
    pub fn with_transcript(mut self, include: bool) -> Self {
        self.include_transcript = include;
        self
    }

    /// Label map over the members that answered in Stage 1
    pub fn anonymize(&self, stage1: &[AgentResponse]) -> Result<AnonymizationMap, DomainError> {
        let ranked = self
            .registry
            .members()
            .iter()
            .filter(|agent| {
                stage1
                    .iter()
                    .any(|r| r.agent_id == agent.id && r.is_success())
            })
            .map(|agent| agent.id.clone());

        let mut rng = match self.label_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        AnonymizationMap::build(ranked, self.label_order, &mut rng)
    }

    pub async fn run(
        &self,
        ctx: &mut TurnContext<'_>,
        stage1: &[AgentResponse],
        transcript: &[CollaborationRound],
    ) -> Result<PeerRankingOutcome, Cancelled> {
        let stage = Stage::Ranking;
        let map = self.anonymize(stage1).unwrap_or_else(|e| {
            warn!("Could not label responses: {}", e);
            AnonymizationMap::default()
        });
        info!("{} ({} labeled responses)", stage, map.len());
        ctx.progress.on_stage_start(&stage, self.registry.len());

        let labeled: Vec<(String, String)> = map
            .entries()
            .filter_map(|(label, agent_id)| {
                stage1
                    .iter()
                    .find(|r| &r.agent_id == agent_id)
                    .map(|r| (label.to_string(), r.text.clone()))
            })
            .collect();

        let rendered_transcript = self.include_transcript.then(|| {
            CouncilPromptTemplate::transcript(transcript, |id| {
                map.label_for(id)
                    .map(|label| label.to_string())
                    .unwrap_or_else(|| "An unranked member".to_string())
            })
        });
        let prompt = CouncilPromptTemplate::ranking_prompt(
            ctx.question.content(),
            &labeled,
            rendered_transcript.as_deref(),
        );

        let members = self.registry.members();
        let queries = members
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

        let mut rankings = Vec::with_capacity(outcomes.len());
        for (agent, outcome) in members.iter().zip(outcomes) {
            let ranking = match outcome {
                Ok(reply) => {
                    let ranking = parse_ranking(agent.id.clone(), reply.text, &map);
                    if !ranking.is_valid {
                        ctx.warn(TurnWarning::RankingParseFailure {
                            evaluator: agent.id.clone(),
                        });
                    }
                    ranking
                }
                Err(reason) => {
                    ctx.warn(TurnWarning::AgentQueryFailure {
                        stage,
                        round: None,
                        agent_id: agent.id.clone(),
                        reason: reason.clone(),
                    });
                    Ranking::failed(agent.id.clone(), reason)
                }
            };
            debug!(
                "{} ranked: {:?}",
                agent.id,
                ranking
                    .parsed_order
                    .iter()
                    .map(|l| l.letters())
                    .collect::<Vec<_>>()
            );
            rankings.push(ranking);
        }

        let aggregate = aggregate_rankings(&rankings, &map);
        info!(
            "{} valid ranking(s), {} agent(s) in consensus",
            rankings.iter().filter(|r| r.is_valid).count(),
            aggregate.len()
        );
        ctx.progress.on_stage_complete(&stage);

        Ok(PeerRankingOutcome {
            stage: RankingStage {
                rankings,
                aggregate,
            },
            map,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoProgress;
    use crate::use_cases::testing::{ScriptedGateway, id, registry};
    use council_domain::{Message, Question};
    use tokio_util::sync::CancellationToken;

    fn stage1(ids: &[&str]) -> Vec<AgentResponse> {
        ids.iter()
            .map(|s| AgentResponse::success(id(s), format!("answer of {s}")))
            .collect()
    }

    async fn run(
        stage: &PeerRankingStage<ScriptedGateway>,
        stage1: &[AgentResponse],
        transcript: &[CollaborationRound],
    ) -> (PeerRankingOutcome, Vec<TurnWarning>) {
        let progress = NoProgress;
        let mut ctx = TurnContext::new(
            Question::new("What is Rust?").unwrap(),
            CancellationToken::new(),
            &progress,
        );
        let outcome = stage.run(&mut ctx, stage1, transcript).await.unwrap();
        (outcome, ctx.take_warnings())
    }

    #[tokio::test]
    async fn test_rankings_parsed_and_aggregated() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply("alice", "B is best.\nFINAL RANKING:\n1. Response B\n2. Response A\n3. Response C")
                .reply("bob", "FINAL RANKING:\n1. Response B\n2. Response C\n3. Response A")
                .reply("charlie", "I liked them all."),
        );
        let stage = PeerRankingStage::new(
            gateway.clone(),
            Arc::new(registry(&["alice", "bob", "charlie"])),
            Duration::from_secs(5),
        );
        let (outcome, warnings) = run(&stage, &stage1(&["alice", "bob", "charlie"]), &[]).await;

        assert_eq!(outcome.stage.rankings.len(), 3);
        assert!(outcome.stage.rankings[0].is_valid);
        assert!(!outcome.stage.rankings[2].is_valid);
        assert_eq!(outcome.stage.rankings[2].raw_text, "I liked them all.");
        assert_eq!(
            warnings,
            vec![TurnWarning::RankingParseFailure { evaluator: id("charlie") }]
        );

        let aggregate = &outcome.stage.aggregate;
        assert_eq!(aggregate[0].agent_id, id("bob"));
        assert_eq!(aggregate[0].average_position, 1.0);
        assert_eq!(aggregate[0].vote_count, 2);
        assert_eq!(aggregate[1].average_position, 2.5);

        // evaluators only ever see labels
        let prompt = gateway.calls_for("alice")[0].context();
        assert!(prompt.contains("Response A:\nanswer of alice"));
        assert!(!prompt.contains("Response A (Alice)"));
    }

    #[tokio::test]
    async fn test_failed_stage1_member_is_not_labeled_but_still_evaluates() {
        let gateway = Arc::new(ScriptedGateway::new().reply(
            "bob",
            "FINAL RANKING:\n1. Response B\n2. Response A",
        ));
        let stage = PeerRankingStage::new(
            gateway.clone(),
            Arc::new(registry(&["alice", "bob", "charlie"])),
            Duration::from_secs(5),
        );
        let stage1 = vec![
            AgentResponse::success(id("alice"), "answer of alice"),
            AgentResponse::failure(id("bob"), "Timeout"),
            AgentResponse::success(id("charlie"), "answer of charlie"),
        ];
        let (outcome, _) = run(&stage, &stage1, &[]).await;

        assert_eq!(outcome.map.len(), 2);
        assert_eq!(outcome.map.label_for(&id("charlie")).unwrap().as_str(), "Response B");
        assert!(outcome.map.label_for(&id("bob")).is_none());
        assert_eq!(gateway.calls_for("bob").len(), 1);
        assert_eq!(outcome.stage.aggregate[0].agent_id, id("charlie"));
    }

    #[tokio::test]
    async fn test_failed_evaluator_yields_invalid_ranking() {
        let gateway = Arc::new(ScriptedGateway::new().fail("alice", "boom"));
        let stage = PeerRankingStage::new(
            gateway,
            Arc::new(registry(&["alice", "bob"])),
            Duration::from_secs(5),
        );
        let (outcome, warnings) = run(&stage, &stage1(&["alice", "bob"]), &[]).await;

        let failed = &outcome.stage.rankings[0];
        assert!(!failed.is_valid);
        assert!(failed.error.as_deref().unwrap().contains("boom"));
        assert!(matches!(
            &warnings[0],
            TurnWarning::AgentQueryFailure { stage: Stage::Ranking, .. }
        ));
    }

    #[tokio::test]
    async fn test_transcript_is_anonymized_when_included() {
        let gateway = Arc::new(ScriptedGateway::new());
        let stage = PeerRankingStage::new(
            gateway.clone(),
            Arc::new(registry(&["alice", "bob"])),
            Duration::from_secs(5),
        )
        .with_transcript(true);

        let transcript = vec![CollaborationRound {
            round_number: 1,
            responses: vec![AgentResponse::success(id("alice"), "I stand by it.")],
            deliveries: vec![Message {
                from_agent_id: id("alice"),
                to_agent_id: id("bob"),
                round_number: 1,
                text: "Check your numbers".to_string(),
            }],
            rejected: vec![],
        }];
        let stage1 = vec![
            AgentResponse::success(id("alice"), "first answer"),
            AgentResponse::success(id("bob"), "second answer"),
        ];
        run(&stage, &stage1, &transcript).await;

        let prompt = gateway.calls_for("bob")[0].messages[1].content.clone();
        assert!(prompt.contains("Response A: I stand by it."));
        assert!(prompt.contains("Response A -> Response B: Check your numbers"));
        assert!(!prompt.contains("alice"));
        assert!(!prompt.contains("Alice"));
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let registry = Arc::new(registry(&["a1", "a2", "a3", "a4", "a5", "a6"]));
        let stage1 = stage1(&["a1", "a2", "a3", "a4", "a5", "a6"]);
        let make = || {
            PeerRankingStage::new(
                Arc::new(ScriptedGateway::new()),
                registry.clone(),
                Duration::from_secs(1),
            )
            .with_label_order(LabelOrder::Shuffled, Some(11))
            .anonymize(&stage1)
            .unwrap()
        };
        assert_eq!(make(), make());
        assert_eq!(make().len(), 6);
    }
}
