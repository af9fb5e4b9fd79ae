//! Deliberation stages

use serde::{Deserialize, Serialize};

/// Stage of a council turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Stage 1 - every member answers independently
    Responses,
    /// Stage 2 - bounded rounds of inter-member messaging
    Collaboration,
    /// Stage 3 - anonymized peer ranking
    Ranking,
    /// Stage 4 - the chairman writes the final answer
    Synthesis,
}

impl Stage {
    pub fn number(&self) -> u8 {
        match self {
            Stage::Responses => 1,
            Stage::Collaboration => 2,
            Stage::Ranking => 3,
            Stage::Synthesis => 4,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Stage::Responses => "responses",
            Stage::Collaboration => "collaboration",
            Stage::Ranking => "ranking",
            Stage::Synthesis => "synthesis",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Stage::Responses => "Individual Responses",
            Stage::Collaboration => "Collaboration",
            Stage::Ranking => "Peer Rankings",
            Stage::Synthesis => "Final Synthesis",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Stage {}: {}", self.number(), self.display_name())
    }
}
