//! Stage 2: bounded-round collaboration
//!
//! ```text
//! Idle ─► RoundInProgress(1) ─► Delivering(1) ─► RoundInProgress(2) ─► ... ─► Complete
//! ```
//!
//! Within a round every member is queried concurrently from a context
//! snapshot built before the round starts. The round ends only when every
//! member has resolved; only then are the round's `send_message` requests
//! routed. Delivered messages become visible from the next round on.

use crate::config::MessageVisibility;
use crate::ports::model_gateway::{ModelGateway, ModelReply};
use crate::use_cases::fan_out::{AgentQuery, fan_out};
use crate::use_cases::shared::{Cancelled, TurnContext, attributed};
use council_domain::action::request::ActionRequest;
use council_domain::{
    ActionSpec, Agent, AgentRegistry, AgentResponse, ChatMessage, CollaborationRound,
    CouncilPromptTemplate, MessageRouter, RejectionReason, Stage, TurnWarning,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoordinatorState {
    Idle,
    RoundInProgress(usize),
    Delivering(usize),
    Complete,
}

/// Runs the collaboration rounds and returns the transcript
pub struct CollaborationCoordinator<G: ModelGateway + 'static> {
    gateway: Arc<G>,
    registry: Arc<AgentRegistry>,
    rounds: usize,
    timeout: Duration,
    visibility: MessageVisibility,
}

impl<G: ModelGateway + 'static> CollaborationCoordinator<G> {
    pub fn new(gateway: Arc<G>, registry: Arc<AgentRegistry>, rounds: usize, timeout: Duration) -> Self {
        Self {
            gateway,
            registry,
            rounds,
            timeout,
            visibility: MessageVisibility::default(),
        }
    }

    pub fn with_visibility(mut self, visibility: MessageVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Run all rounds over the given Stage 1 results.
    ///
    /// Only successful Stage 1 responses are shown to members; every member
    /// still takes part in every round.
    pub async fn run(
        &self,
        ctx: &mut TurnContext<'_>,
        stage1: &[AgentResponse],
    ) -> Result<Vec<CollaborationRound>, Cancelled> {
        let stage = Stage::Collaboration;
        let mut transcript: Vec<CollaborationRound> = Vec::with_capacity(self.rounds);
        if self.rounds == 0 {
            debug!("No collaboration rounds configured");
            return Ok(transcript);
        }

        info!("{} ({} rounds)", stage, self.rounds);
        ctx.progress
            .on_stage_start(&stage, self.rounds * self.registry.len());

        let members = self.registry.members();
        let opening = CouncilPromptTemplate::collaboration_context(
            ctx.question.content(),
            &attributed(members, stage1, false),
        );
        let names: Vec<&str> = members.iter().map(|a| a.display_name.as_str()).collect();
        let send_message = ActionSpec::send_message(&names);

        let mut state = CoordinatorState::Idle;
        for round in 1..=self.rounds {
            state = self.transition(state, CoordinatorState::RoundInProgress(round));
            ctx.progress.on_round_start(round, self.rounds);

            let queries = members
                .iter()
                .map(|agent| {
                    AgentQuery::new(agent.clone(), self.context_for(agent, &opening, &transcript))
                        .with_actions(vec![send_message.clone()])
                })
                .collect();

            // Barrier: returns once every member of this round has resolved
            let outcomes = fan_out(
                &self.gateway,
                stage,
                queries,
                self.timeout,
                &ctx.cancel,
                ctx.progress,
            )
            .await?;

            state = self.transition(state, CoordinatorState::Delivering(round));
            let responses = Self::decode(ctx, members, round, outcomes);
            let routing = MessageRouter::new(&self.registry).route(round, &responses);

            for rejected in &routing.rejected {
                let ActionRequest::SendMessage { to_agent_id, .. } = &rejected.request;
                let warning = match rejected.reason {
                    RejectionReason::InvalidRecipient => TurnWarning::InvalidRecipient {
                        round,
                        from: rejected.from_agent_id.clone(),
                        to: to_agent_id.clone(),
                    },
                    RejectionReason::EmptyMessage => TurnWarning::MalformedAction {
                        round,
                        from: rejected.from_agent_id.clone(),
                        reason: format!("empty message to {}", to_agent_id),
                    },
                };
                ctx.warn(warning);
            }

            info!(
                "Round {}: {} message(s) delivered, {} rejected",
                round,
                routing.delivered.len(),
                routing.rejected.len()
            );

            transcript.push(CollaborationRound {
                round_number: round,
                responses,
                deliveries: routing.delivered,
                rejected: routing.rejected,
            });
        }

        self.transition(state, CoordinatorState::Complete);
        ctx.progress.on_stage_complete(&stage);
        Ok(transcript)
    }

    fn transition(&self, from: CoordinatorState, to: CoordinatorState) -> CoordinatorState {
        debug!("Collaboration: {:?} -> {:?}", from, to);
        to
    }

    /// Context snapshot for one member at the start of the next round
    fn context_for(
        &self,
        agent: &Agent,
        opening: &str,
        transcript: &[CollaborationRound],
    ) -> Vec<ChatMessage> {
        let mut messages = vec![
            ChatMessage::system(CouncilPromptTemplate::collaboration_system(agent)),
            ChatMessage::user(opening),
        ];

        for (i, previous) in transcript.iter().enumerate() {
            if let Some(own) = previous
                .response_of(&agent.id)
                .and_then(Self::own_contribution)
            {
                messages.push(ChatMessage::assistant(own));
            }

            let inbox: Vec<(String, String)> = match self.visibility {
                MessageVisibility::Addressed => previous
                    .inbox(&agent.id)
                    .map(|m| {
                        (
                            self.registry.display_name(&m.from_agent_id).to_string(),
                            m.text.clone(),
                        )
                    })
                    .collect(),
                MessageVisibility::Council => previous
                    .deliveries
                    .iter()
                    .map(|m| {
                        (
                            format!(
                                "{} (to {})",
                                self.registry.display_name(&m.from_agent_id),
                                self.registry.display_name(&m.to_agent_id)
                            ),
                            m.text.clone(),
                        )
                    })
                    .collect(),
            };

            let mut text =
                CouncilPromptTemplate::delivered_messages(previous.round_number, &inbox);
            if i + 1 == transcript.len() {
                text.push_str("\n\n");
                text.push_str(CouncilPromptTemplate::continue_discussion());
            }
            messages.push(ChatMessage::user(text));
        }

        messages
    }

    /// What a member said and sent in a round, replayed as its own turn
    fn own_contribution(response: &AgentResponse) -> Option<String> {
        let mut parts: Vec<String> = response.remark().map(str::to_string).into_iter().collect();
        for request in &response.action_requests {
            match request {
                ActionRequest::SendMessage { to_agent_id, text } => {
                    parts.push(format!("[message to {}] {}", to_agent_id, text));
                }
            }
        }
        (!parts.is_empty()).then(|| parts.join("\n"))
    }

    fn decode(
        ctx: &mut TurnContext<'_>,
        members: &[Agent],
        round: usize,
        outcomes: Vec<Result<ModelReply, String>>,
    ) -> Vec<AgentResponse> {
        members
            .iter()
            .zip(outcomes)
            .map(|(agent, outcome)| match outcome {
                Ok(reply) => {
                    let mut actions = Vec::new();
                    for invocation in &reply.invocations {
                        match ActionRequest::try_from(invocation) {
                            Ok(request) => actions.push(request),
                            Err(e) => ctx.warn(TurnWarning::MalformedAction {
                                round,
                                from: agent.id.clone(),
                                reason: e.to_string(),
                            }),
                        }
                    }
                    AgentResponse::success(agent.id.clone(), reply.text).with_actions(actions)
                }
                Err(reason) => {
                    ctx.warn(TurnWarning::AgentQueryFailure {
                        stage: Stage::Collaboration,
                        round: Some(round),
                        agent_id: agent.id.clone(),
                        reason: reason.clone(),
                    });
                    AgentResponse::failure(agent.id.clone(), reason)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::testing::{RecordingProgress, ScriptedGateway, id, registry};
    use council_domain::{ActionInvocation, ChatRole, Question, SEND_MESSAGE};
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    fn send(to: &str, message: &str) -> ActionInvocation {
        ActionInvocation::new(SEND_MESSAGE, json!({"to_member": to, "message": message}))
    }

    fn stage1(ids: &[&str]) -> Vec<AgentResponse> {
        ids.iter()
            .map(|s| AgentResponse::success(id(s), format!("initial answer of {s}")))
            .collect()
    }

    fn coordinator(
        gateway: Arc<ScriptedGateway>,
        ids: &[&str],
        rounds: usize,
    ) -> CollaborationCoordinator<ScriptedGateway> {
        CollaborationCoordinator::new(
            gateway,
            Arc::new(registry(ids)),
            rounds,
            Duration::from_secs(5),
        )
    }

    async fn run(
        coordinator: &CollaborationCoordinator<ScriptedGateway>,
        stage1: &[AgentResponse],
        progress: &RecordingProgress,
    ) -> (Vec<CollaborationRound>, Vec<TurnWarning>) {
        let mut ctx = TurnContext::new(
            Question::new("What is Rust?").unwrap(),
            CancellationToken::new(),
            progress,
        );
        let transcript = coordinator.run(&mut ctx, stage1).await.unwrap();
        (transcript, ctx.take_warnings())
    }

    #[tokio::test]
    async fn test_messages_visible_only_from_next_round() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply_with_actions("alice", "Bob has a point.", vec![send("Bob", "ping-from-alice")])
                .reply("alice", "Nothing more."),
        );
        let coordinator = coordinator(gateway.clone(), &["alice", "bob"], 2);
        let progress = RecordingProgress::default();
        let (transcript, warnings) = run(&coordinator, &stage1(&["alice", "bob"]), &progress).await;

        assert!(warnings.is_empty());
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].deliveries.len(), 1);
        assert_eq!(transcript[0].deliveries[0].to_agent_id, id("bob"));
        assert_eq!(transcript[0].deliveries[0].round_number, 1);
        assert!(transcript[1].deliveries.is_empty());

        let bob_calls = gateway.calls_for("bob");
        assert_eq!(bob_calls.len(), 2);
        assert!(!bob_calls[0].context().contains("ping-from-alice"));
        assert!(bob_calls[1].context().contains("From Alice: ping-from-alice"));
        assert!(bob_calls[1].context().contains("Continue the discussion"));

        // alice replays her own round-1 turn, but never sees her message as delivered
        let alice_round2 = &gateway.calls_for("alice")[1];
        let replay = alice_round2
            .messages
            .iter()
            .find(|m| m.role == ChatRole::Assistant)
            .unwrap();
        assert!(replay.content.contains("Bob has a point."));
        assert!(replay.content.contains("[message to Bob] ping-from-alice"));
        assert!(!alice_round2.context().contains("From Alice"));

        assert!(bob_calls[0].actions.as_ref().unwrap()[0].name == SEND_MESSAGE);
        let events = progress.events();
        assert!(events.contains(&"round 1/2".to_string()));
        assert!(events.contains(&"round 2/2".to_string()));
    }

    #[tokio::test]
    async fn test_failed_stage1_member_excluded_from_context() {
        let gateway = Arc::new(ScriptedGateway::new());
        let coordinator = coordinator(gateway.clone(), &["alice", "bob", "charlie"], 2);
        let stage1 = vec![
            AgentResponse::success(id("alice"), "alice-initial"),
            AgentResponse::failure(id("bob"), "Timeout"),
            AgentResponse::success(id("charlie"), "charlie-initial"),
        ];
        let progress = RecordingProgress::default();
        let (transcript, _) = run(&coordinator, &stage1, &progress).await;

        assert_eq!(transcript.len(), 2);
        for round in &transcript {
            assert_eq!(round.responses.len(), 3);
        }

        for member in ["alice", "bob", "charlie"] {
            let first = &gateway.calls_for(member)[0];
            let context = first.context();
            assert!(context.contains("alice-initial"));
            assert!(context.contains("charlie-initial"));
            assert!(!context.contains("Bob (Member):"));
        }
    }

    #[tokio::test]
    async fn test_invalid_recipient_dropped_others_delivered() {
        let gateway = Arc::new(ScriptedGateway::new().reply_with_actions(
            "alice",
            "Writing to a few people.",
            vec![send("dave", "hello?"), send("charlie", "agree with you")],
        ));
        let coordinator = coordinator(gateway, &["alice", "bob", "charlie"], 1);
        let progress = RecordingProgress::default();
        let (transcript, warnings) =
            run(&coordinator, &stage1(&["alice", "bob", "charlie"]), &progress).await;

        let round = &transcript[0];
        assert_eq!(round.deliveries.len(), 1);
        assert_eq!(round.deliveries[0].to_agent_id, id("charlie"));
        assert_eq!(round.rejected.len(), 1);
        assert_eq!(round.rejected[0].reason, RejectionReason::InvalidRecipient);

        assert_eq!(
            warnings,
            vec![TurnWarning::InvalidRecipient {
                round: 1,
                from: id("alice"),
                to: "dave".to_string(),
            }]
        );
        assert_eq!(progress.warnings.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_slow_member_fails_only_its_round_slot() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply("alice", "quick")
                .delay("bob", Duration::from_secs(5)),
        );
        let coordinator = CollaborationCoordinator::new(
            gateway,
            Arc::new(registry(&["alice", "bob"])),
            1,
            Duration::from_millis(50),
        );
        let progress = RecordingProgress::default();
        let (transcript, warnings) = run(&coordinator, &stage1(&["alice", "bob"]), &progress).await;

        let round = &transcript[0];
        assert!(round.responses[0].is_success());
        assert!(round.responses[1].is_failure);
        assert_eq!(round.failure_count(), 1);
        assert!(matches!(
            &warnings[0],
            TurnWarning::AgentQueryFailure { round: Some(1), agent_id, .. } if *agent_id == id("bob")
        ));
    }

    #[tokio::test]
    async fn test_council_visibility_shows_every_delivery() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .reply_with_actions("alice", "", vec![send("bob", "for bob only")])
                .reply("alice", "done"),
        );
        let coordinator = coordinator(gateway.clone(), &["alice", "bob", "charlie"], 2)
            .with_visibility(MessageVisibility::Council);
        let progress = RecordingProgress::default();
        run(&coordinator, &stage1(&["alice", "bob", "charlie"]), &progress).await;

        let charlie_round2 = &gateway.calls_for("charlie")[1];
        assert!(charlie_round2.context().contains("From Alice (to Bob): for bob only"));
    }

    #[tokio::test]
    async fn test_malformed_invocation_is_reported() {
        let gateway = Arc::new(ScriptedGateway::new().reply_with_actions(
            "alice",
            "hmm",
            vec![
                ActionInvocation::new("shout", json!({})),
                ActionInvocation::new(SEND_MESSAGE, json!({"to_member": "bob"})),
            ],
        ));
        let coordinator = coordinator(gateway, &["alice", "bob"], 1);
        let progress = RecordingProgress::default();
        let (transcript, warnings) = run(&coordinator, &stage1(&["alice", "bob"]), &progress).await;

        assert!(transcript[0].deliveries.is_empty());
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| matches!(w, TurnWarning::MalformedAction { .. })));
    }

    #[tokio::test]
    async fn test_zero_rounds() {
        let gateway = Arc::new(ScriptedGateway::new());
        let coordinator = coordinator(gateway.clone(), &["alice"], 0);
        let progress = RecordingProgress::default();
        let (transcript, _) = run(&coordinator, &stage1(&["alice"]), &progress).await;

        assert!(transcript.is_empty());
        assert_eq!(gateway.call_count(), 0);
    }
}
