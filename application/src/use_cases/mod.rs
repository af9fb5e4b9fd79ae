//! Use cases
//!
//! One module per deliberation stage plus the turn orchestrator.

pub mod collaborate;
pub mod collect_rankings;
pub mod collect_responses;
pub(crate) mod fan_out;
pub mod generate_title;
pub mod run_council;
pub mod shared;
pub mod synthesize;

#[cfg(test)]
pub(crate) mod testing;
