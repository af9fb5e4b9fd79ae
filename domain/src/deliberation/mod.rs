//! Deliberation records.
//!
//! Everything produced while a turn runs through the four stages:
//!
//! - [`response::AgentResponse`]: one agent's answer to one query
//! - [`message::Message`]: a routed inter-agent message
//! - [`round::CollaborationRound`]: one barrier-synchronized Stage 2 round
//! - [`router::MessageRouter`]: validates and routes action requests
//! - [`bundle::StageBundle`]: the finished result of all four stages
//! - [`warning::TurnWarning`]: non-fatal degradations recorded along the way
//!
//! All of these are scoped to a single turn and immutable once built.

pub mod bundle;
pub mod message;
pub mod response;
pub mod round;
pub mod router;
pub mod stage;
pub mod warning;
