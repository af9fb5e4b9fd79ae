//! Domain layer for llm-council
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! A fixed panel of agents (council members), each with its own personality,
//! role and model, plus a designated synthesizer (the chairman).
//!
//! ## Deliberation
//!
//! Every user query runs through four stages:
//!
//! 1. **Responses**: each member answers independently
//! 2. **Collaboration**: bounded rounds of inter-member messaging
//! 3. **Ranking**: anonymized peer ranking, aggregated into a consensus order
//! 4. **Synthesis**: the chairman writes the final answer
//!
//! The domain owns the pure parts of that flow: message routing, label
//! anonymization, ranking parsing and aggregation, and prompt construction.

pub mod action;
pub mod config;
pub mod core;
pub mod council;
pub mod deliberation;
pub mod prompt;
pub mod ranking;
pub mod session;

// Re-export commonly used types
pub use action::{
    request::ActionRequest,
    spec::{ActionInvocation, ActionSpec, SEND_MESSAGE},
};
pub use config::output_format::OutputFormat;
pub use core::{error::DomainError, model::Model, question::Question};
pub use council::{
    agent::{Agent, AgentId},
    registry::{AgentRegistry, ambiguous_name},
};
pub use deliberation::{
    bundle::{RankingStage, StageBundle, TurnMetadata},
    message::{Message, RejectedAction, RejectionReason},
    response::AgentResponse,
    round::CollaborationRound,
    router::{MessageRouter, RoutingOutcome},
    stage::Stage,
    warning::TurnWarning,
};
pub use prompt::CouncilPromptTemplate;
pub use ranking::{
    aggregate::{AggregateEntry, aggregate_rankings},
    anonymizer::{AnonymizationMap, LabelOrder},
    label::Label,
    parsing::{FINAL_RANKING_MARKER, Ranking, parse_ranking},
};
pub use session::message::{ChatMessage, ChatRole};
