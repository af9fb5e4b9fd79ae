//! Application layer for llm-council
//!
//! This crate contains the stage use cases, port definitions, and the
//! deliberation parameters. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{CouncilParams, MessageVisibility};
pub use ports::{
    conversation_store::{ConversationStore, NoConversationStore, StoreError, TurnRecord},
    model_gateway::{GatewayError, ModelGateway, ModelReply},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::collaborate::CollaborationCoordinator;
pub use use_cases::collect_rankings::{PeerRankingOutcome, PeerRankingStage};
pub use use_cases::collect_responses::ResponseCollector;
pub use use_cases::generate_title::{FALLBACK_TITLE, TitleGenerator, clean_title};
pub use use_cases::run_council::{
    CouncilTurn, PartialTurn, RunCouncilError, RunCouncilInput, RunCouncilUseCase,
};
pub use use_cases::shared::{Cancelled, TurnContext};
pub use use_cases::synthesize::{SynthesisError, SynthesisStage};
