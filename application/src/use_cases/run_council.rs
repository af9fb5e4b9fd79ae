//! Run Council use case
//!
//! Orchestrates one full council turn:
//!
//! ```text
//! question ─► Stage 1 ─┬─► Stage 2 ─┐
//!                      └─► Stage 3 ─┴─► Stage 4 ─► StageBundle + TurnMetadata
//! ```
//!
//! Partial failures degrade gracefully and are reported as warnings. Only
//! a Stage 1 with no successful member, a failed synthesis, or cancellation
//! end the turn early.

use crate::config::CouncilParams;
use crate::ports::conversation_store::{ConversationStore, NoConversationStore, TurnRecord};
use crate::ports::model_gateway::ModelGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::collaborate::CollaborationCoordinator;
use crate::use_cases::collect_rankings::PeerRankingStage;
use crate::use_cases::collect_responses::ResponseCollector;
use crate::use_cases::generate_title::TitleGenerator;
use crate::use_cases::shared::{Cancelled, TurnContext};
use crate::use_cases::synthesize::{SynthesisError, SynthesisStage};
use council_domain::{
    AgentRegistry, AgentResponse, CollaborationRound, Question, RankingStage, StageBundle,
    TurnMetadata,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Stages 1-3 of a turn whose synthesis failed
#[derive(Debug, Clone)]
pub struct PartialTurn {
    pub stage1: Vec<AgentResponse>,
    pub stage2: Vec<CollaborationRound>,
    pub stage3: RankingStage,
    pub metadata: TurnMetadata,
}

/// Errors that end a council turn
#[derive(Error, Debug)]
pub enum RunCouncilError {
    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("All council members failed to respond")]
    AllAgentsFailed { stage1: Vec<AgentResponse> },

    #[error("Synthesis failed: {reason}")]
    SynthesizerFailure {
        reason: String,
        partial: Box<PartialTurn>,
    },

    #[error("Turn cancelled")]
    Cancelled,
}

impl From<Cancelled> for RunCouncilError {
    fn from(_: Cancelled) -> Self {
        RunCouncilError::Cancelled
    }
}

/// Input for the RunCouncil use case
#[derive(Debug, Clone)]
pub struct RunCouncilInput {
    pub conversation_id: String,
    /// Raw user query, validated when the turn starts
    pub question: String,
    /// Ask the synthesizer for a short conversation title
    pub generate_title: bool,
    pub cancellation: Option<CancellationToken>,
}

impl RunCouncilInput {
    /// Input for a new conversation with a fresh id
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            conversation_id: uuid::Uuid::new_v4().to_string(),
            question: question.into(),
            generate_title: false,
            cancellation: None,
        }
    }

    pub fn with_conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = id.into();
        self
    }

    pub fn with_title(mut self) -> Self {
        self.generate_title = true;
        self
    }

    /// Set a cancellation token for aborting the turn
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// A finished council turn
#[derive(Debug, Clone)]
pub struct CouncilTurn {
    pub conversation_id: String,
    pub question: Question,
    pub bundle: StageBundle,
    /// Ephemeral; not part of what gets persisted
    pub metadata: TurnMetadata,
}

/// Use case for running one council turn
pub struct RunCouncilUseCase<G: ModelGateway + 'static> {
    gateway: Arc<G>,
    registry: Arc<AgentRegistry>,
    params: CouncilParams,
    store: Arc<dyn ConversationStore>,
}

impl<G: ModelGateway + 'static> RunCouncilUseCase<G> {
    pub fn new(gateway: Arc<G>, registry: Arc<AgentRegistry>, params: CouncilParams) -> Self {
        Self {
            gateway,
            registry,
            params,
            store: Arc::new(NoConversationStore),
        }
    }

    /// Persist finished turns to `store`
    pub fn with_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = store;
        self
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn params(&self) -> &CouncilParams {
        &self.params
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunCouncilInput) -> Result<CouncilTurn, RunCouncilError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunCouncilInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<CouncilTurn, RunCouncilError> {
        let question = Question::new(input.question.as_str())
            .map_err(|e| RunCouncilError::InvalidQuestion(e.to_string()))?;
        let cancel = input.cancellation.clone().unwrap_or_default();

        info!(
            "Starting council turn {} with {} members",
            input.conversation_id,
            self.registry.len()
        );

        let mut ctx = TurnContext::new(question.clone(), cancel.clone(), progress);
        // A title is still wanted when only synthesis fails
        let title_cancel = cancel.child_token();
        let stages_task = async {
            let result = self.run_stages(&mut ctx).await;
            if let Err(e) = &result
                && !matches!(e, RunCouncilError::SynthesizerFailure { .. })
            {
                title_cancel.cancel();
            }
            result
        };
        let title_task = async {
            if !input.generate_title {
                return None;
            }
            let generator = TitleGenerator::new(
                Arc::clone(&self.gateway),
                self.registry.synthesizer().clone(),
                self.params.title_timeout,
            );
            Some(generator.generate(question.content(), &title_cancel).await)
        };

        let (stages, title) = tokio::join!(stages_task, title_task);

        let (bundle, mut metadata) = match stages {
            Ok(done) => done,
            Err(RunCouncilError::SynthesizerFailure {
                reason,
                mut partial,
            }) => {
                partial.metadata.title = title;
                return Err(RunCouncilError::SynthesizerFailure { reason, partial });
            }
            Err(e) => return Err(e),
        };
        metadata.title = title;

        let record = TurnRecord::new(
            input.conversation_id.as_str(),
            question.content(),
            metadata.title.clone(),
            bundle.clone(),
        );
        if let Err(e) = self.store.append(&record) {
            warn!("Failed to store turn for {}: {}", input.conversation_id, e);
        }

        info!(
            "Council turn {} complete with {} warning(s)",
            input.conversation_id,
            metadata.warnings.len()
        );

        Ok(CouncilTurn {
            conversation_id: input.conversation_id,
            question,
            bundle,
            metadata,
        })
    }

    async fn run_stages(
        &self,
        ctx: &mut TurnContext<'_>,
    ) -> Result<(StageBundle, TurnMetadata), RunCouncilError> {
        let gateway = &self.gateway;
        let registry = &self.registry;
        let params = &self.params;

        // Stage 1
        let stage1 = ResponseCollector::new(gateway.clone(), registry.clone(), params.agent_timeout)
            .collect(ctx)
            .await?;
        if stage1.iter().all(|r| r.is_failure) {
            return Err(RunCouncilError::AllAgentsFailed { stage1 });
        }

        // Stage 2
        let stage2 = CollaborationCoordinator::new(
            gateway.clone(),
            registry.clone(),
            params.rounds,
            params.agent_timeout,
        )
        .with_visibility(params.message_visibility)
        .run(ctx, &stage1)
        .await?;

        // Stage 3
        let ranking = PeerRankingStage::new(gateway.clone(), registry.clone(), params.agent_timeout)
            .with_label_order(params.label_order, params.label_seed)
            .with_transcript(params.include_transcript_in_ranking)
            .run(ctx, &stage1, &stage2)
            .await?;

        let mut metadata = TurnMetadata {
            label_to_agent: ranking.map.to_label_map(),
            aggregate_rankings: ranking.stage.aggregate.clone(),
            ..TurnMetadata::default()
        };

        // Stage 4
        let synthesis = SynthesisStage::new(gateway.clone(), registry.clone(), params.synthesis_timeout)
            .run(ctx, &stage1, &stage2, &ranking)
            .await;
        metadata.warnings = ctx.take_warnings();

        match synthesis {
            Ok(stage4) => Ok((
                StageBundle {
                    stage1,
                    stage2,
                    stage3: ranking.stage,
                    stage4,
                },
                metadata,
            )),
            Err(SynthesisError::Cancelled(_)) => Err(RunCouncilError::Cancelled),
            Err(SynthesisError::Failed(reason)) => {
                warn!("Synthesis failed: {}", reason);
                Err(RunCouncilError::SynthesizerFailure {
                    reason,
                    partial: Box::new(PartialTurn {
                        stage1,
                        stage2,
                        stage3: ranking.stage,
                        metadata,
                    }),
                })
            }
        }
    }
}
