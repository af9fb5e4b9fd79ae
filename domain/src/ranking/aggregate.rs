//! Consensus ordering across peer rankings

use super::anonymizer::AnonymizationMap;
use super::parsing::Ranking;
use crate::council::agent::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An agent's place in the consensus ("street cred")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateEntry {
    pub agent_id: AgentId,
    /// Mean 1-based position over the valid rankings that mention the agent
    pub average_position: f64,
    /// Number of valid rankings that mention the agent
    pub vote_count: usize,
}

/// Combine valid rankings into one ordering, best first.
///
/// Invalid rankings are skipped. An agent only receives a position from
/// evaluators that listed it; agents nobody listed are omitted. Ordering is
/// ascending average position, then descending vote count, then agent id.
pub fn aggregate_rankings(rankings: &[Ranking], map: &AnonymizationMap) -> Vec<AggregateEntry> {
    let mut positions: BTreeMap<&AgentId, Vec<usize>> = BTreeMap::new();

    for ranking in rankings.iter().filter(|r| r.is_valid) {
        for (index, label) in ranking.parsed_order.iter().enumerate() {
            if let Some(agent) = map.agent_for(label) {
                positions.entry(agent).or_default().push(index + 1);
            }
        }
    }

    let mut entries: Vec<AggregateEntry> = positions
        .into_iter()
        .map(|(agent, ranks)| {
            let sum: usize = ranks.iter().sum();
            AggregateEntry {
                agent_id: agent.clone(),
                average_position: sum as f64 / ranks.len() as f64,
                vote_count: ranks.len(),
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        a.average_position
            .total_cmp(&b.average_position)
            .then_with(|| b.vote_count.cmp(&a.vote_count))
            .then_with(|| a.agent_id.cmp(&b.agent_id))
    });

    entries
}
