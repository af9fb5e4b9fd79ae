//! Peer ranking domain
//!
//! Stage 3 of a council turn: members rank each other's Stage 1 answers
//! without knowing who wrote them.
//!
//! ```text
//! AgentIds ──► AnonymizationMap ──► prompt with "Response A", "Response B", ...
//!                     │
//! evaluation text ──► parse_ranking ──► Ranking { parsed_order: [B, A] }
//!                     │
//! valid Rankings ──► aggregate_rankings ──► [AggregateEntry] best first
//! ```

pub mod aggregate;
pub mod anonymizer;
pub mod label;
pub mod parsing;
