//! Stage bundle: the finished output of a council turn

use super::response::AgentResponse;
use super::round::CollaborationRound;
use super::warning::TurnWarning;
use crate::council::agent::AgentId;
use crate::ranking::aggregate::AggregateEntry;
use crate::ranking::parsing::Ranking;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stage 3 output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingStage {
    /// One ranking per evaluator, in registry order
    pub rankings: Vec<Ranking>,
    /// Consensus order, best first
    pub aggregate: Vec<AggregateEntry>,
}

impl RankingStage {
    pub fn valid_rankings(&self) -> impl Iterator<Item = &Ranking> {
        self.rankings.iter().filter(|r| r.is_valid)
    }
}

/// Everything a turn produced, handed to the persistence collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageBundle {
    pub stage1: Vec<AgentResponse>,
    pub stage2: Vec<CollaborationRound>,
    pub stage3: RankingStage,
    pub stage4: AgentResponse,
}

impl StageBundle {
    /// Stage 1 responses that succeeded
    pub fn successful_responses(&self) -> impl Iterator<Item = &AgentResponse> {
        self.stage1.iter().filter(|r| r.is_success())
    }

    /// Stage 1 responses that failed
    pub fn failed_responses(&self) -> impl Iterator<Item = &AgentResponse> {
        self.stage1.iter().filter(|r| r.is_failure)
    }
}

/// Ephemeral per-turn metadata
///
/// Returned alongside the bundle; callers are not expected to persist it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnMetadata {
    /// Anonymous label (e.g. "Response A") to agent id
    pub label_to_agent: BTreeMap<String, AgentId>,
    pub aggregate_rankings: Vec<AggregateEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<TurnWarning>,
    /// Short conversation title, generated on request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> AgentId {
        AgentId::new(s).unwrap()
    }

    #[test]
    fn test_bundle_filters() {
        let bundle = StageBundle {
            stage1: vec![
                AgentResponse::success(id("alice"), "A"),
                AgentResponse::failure(id("bob"), "down"),
            ],
            stage2: vec![],
            stage3: RankingStage::default(),
            stage4: AgentResponse::success(id("chairman"), "final"),
        };
        assert_eq!(bundle.successful_responses().count(), 1);
        assert_eq!(bundle.failed_responses().next().unwrap().agent_id, id("bob"));
    }

    #[test]
    fn test_bundle_serializes_stage_keys() {
        let bundle = StageBundle {
            stage1: vec![],
            stage2: vec![],
            stage3: RankingStage::default(),
            stage4: AgentResponse::success(id("chairman"), "final"),
        };
        let json = serde_json::to_value(&bundle).unwrap();
        for key in ["stage1", "stage2", "stage3", "stage4"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json["stage3"].get("rankings").is_some());
        assert!(json["stage3"].get("aggregate").is_some());
    }
}
