//! Per-turn deliberation control.
//!
//! [`CouncilParams`] groups the static knobs that shape a council turn:
//! how many collaboration rounds to run, how long to wait for each agent,
//! and how Stage 3 anonymization behaves. These are application-layer
//! concerns, not domain policy.

use council_domain::LabelOrder;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which delivered messages a member sees in later collaboration rounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageVisibility {
    /// Only messages addressed to the member
    #[default]
    Addressed,
    /// Every message delivered to anyone on the council
    Council,
}

impl std::str::FromStr for MessageVisibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "addressed" | "direct" => Ok(MessageVisibility::Addressed),
            "council" | "all" => Ok(MessageVisibility::Council),
            other => Err(format!("unknown message visibility: {}", other)),
        }
    }
}

/// Deliberation control parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouncilParams {
    /// Number of collaboration rounds; 0 skips Stage 2
    pub rounds: usize,
    /// Per-agent query timeout for Stages 1-3
    pub agent_timeout: Duration,
    /// Timeout for the Stage 4 synthesizer query
    pub synthesis_timeout: Duration,
    /// Timeout for conversation title generation
    pub title_timeout: Duration,
    pub label_order: LabelOrder,
    /// Show evaluators the (anonymized) Stage 2 transcript
    pub include_transcript_in_ranking: bool,
    pub message_visibility: MessageVisibility,
    /// Fixed seed for shuffled labels, for reproducible runs
    pub label_seed: Option<u64>,
}

impl Default for CouncilParams {
    fn default() -> Self {
        Self {
            rounds: 2,
            agent_timeout: Duration::from_secs(45),
            synthesis_timeout: Duration::from_secs(120),
            title_timeout: Duration::from_secs(30),
            label_order: LabelOrder::Registry,
            include_transcript_in_ranking: false,
            message_visibility: MessageVisibility::Addressed,
            label_seed: None,
        }
    }
}

impl CouncilParams {
    // ==================== Builder Methods ====================

    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }

    pub fn with_synthesis_timeout(mut self, timeout: Duration) -> Self {
        self.synthesis_timeout = timeout;
        self
    }

    pub fn with_title_timeout(mut self, timeout: Duration) -> Self {
        self.title_timeout = timeout;
        self
    }

    pub fn with_label_order(mut self, order: LabelOrder) -> Self {
        self.label_order = order;
        self
    }

    pub fn with_transcript_in_ranking(mut self, include: bool) -> Self {
        self.include_transcript_in_ranking = include;
        self
    }

    pub fn with_message_visibility(mut self, visibility: MessageVisibility) -> Self {
        self.message_visibility = visibility;
        self
    }

    pub fn with_label_seed(mut self, seed: u64) -> Self {
        self.label_seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = CouncilParams::default();
        assert_eq!(params.rounds, 2);
        assert_eq!(params.agent_timeout, Duration::from_secs(45));
        assert_eq!(params.synthesis_timeout, Duration::from_secs(120));
        assert_eq!(params.label_order, LabelOrder::Registry);
        assert!(!params.include_transcript_in_ranking);
        assert_eq!(params.message_visibility, MessageVisibility::Addressed);
    }

    #[test]
    fn test_builder() {
        let params = CouncilParams::default()
            .with_rounds(0)
            .with_label_order(LabelOrder::Shuffled)
            .with_label_seed(42)
            .with_message_visibility(MessageVisibility::Council);

        assert_eq!(params.rounds, 0);
        assert_eq!(params.label_order, LabelOrder::Shuffled);
        assert_eq!(params.label_seed, Some(42));
        assert_eq!(params.message_visibility, MessageVisibility::Council);
    }

    #[test]
    fn test_visibility_from_str() {
        assert_eq!("council".parse::<MessageVisibility>(), Ok(MessageVisibility::Council));
        assert_eq!("Addressed".parse::<MessageVisibility>(), Ok(MessageVisibility::Addressed));
        assert!("everyone-ish".parse::<MessageVisibility>().is_err());
    }
}
