//! Deliberation configuration from TOML (`[deliberation]` section)

use super::issue::ConfigIssue;
use council_application::MessageVisibility;
use council_domain::LabelOrder;
use serde::{Deserialize, Serialize};

/// Raw deliberation configuration from TOML
///
/// # Example
///
/// ```toml
/// [deliberation]
/// rounds = 2
/// agent_timeout_seconds = 45
/// synthesis_timeout_seconds = 120
/// label_order = "shuffled"             # "registry" or "shuffled"
/// message_visibility = "addressed"     # "addressed" or "council"
/// include_transcript_in_ranking = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDeliberationConfig {
    /// Collaboration rounds (0 skips Stage 2)
    pub rounds: usize,
    pub agent_timeout_seconds: u64,
    pub synthesis_timeout_seconds: u64,
    pub title_timeout_seconds: u64,
    /// Label assignment: "registry" or "shuffled"
    pub label_order: String,
    /// Fixed shuffle seed for reproducible labels
    pub label_seed: Option<u64>,
    pub include_transcript_in_ranking: bool,
    /// Message visibility: "addressed" or "council"
    pub message_visibility: String,
}

impl Default for FileDeliberationConfig {
    fn default() -> Self {
        Self {
            rounds: 2,
            agent_timeout_seconds: 45,
            synthesis_timeout_seconds: 120,
            title_timeout_seconds: 30,
            label_order: "registry".to_string(),
            label_seed: None,
            include_transcript_in_ranking: false,
            message_visibility: "addressed".to_string(),
        }
    }
}

impl FileDeliberationConfig {
    /// Parse label_order, returning warnings on failure.
    pub fn parse_label_order(&self) -> (LabelOrder, Vec<ConfigIssue>) {
        match self.label_order.parse::<LabelOrder>() {
            Ok(order) => (order, vec![]),
            Err(_) => (
                LabelOrder::default(),
                vec![ConfigIssue::invalid_enum(
                    "deliberation.label_order",
                    &self.label_order,
                    &["registry", "shuffled"],
                    "registry",
                )],
            ),
        }
    }

    /// Parse message_visibility, returning warnings on failure.
    pub fn parse_message_visibility(&self) -> (MessageVisibility, Vec<ConfigIssue>) {
        match self.message_visibility.parse::<MessageVisibility>() {
            Ok(visibility) => (visibility, vec![]),
            Err(_) => (
                MessageVisibility::default(),
                vec![ConfigIssue::invalid_enum(
                    "deliberation.message_visibility",
                    &self.message_visibility,
                    &["addressed", "council"],
                    "addressed",
                )],
            ),
        }
    }

    /// Zero timeouts are errors: every query would fail immediately
    pub fn timeout_issues(&self) -> Vec<ConfigIssue> {
        [
            ("deliberation.agent_timeout_seconds", self.agent_timeout_seconds),
            (
                "deliberation.synthesis_timeout_seconds",
                self.synthesis_timeout_seconds,
            ),
            ("deliberation.title_timeout_seconds", self.title_timeout_seconds),
        ]
        .into_iter()
        .filter(|(_, secs)| *secs == 0)
        .map(|(field, _)| ConfigIssue::zero_timeout(field))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enums() {
        let config = FileDeliberationConfig {
            label_order: "Shuffled".to_string(),
            message_visibility: "council".to_string(),
            ..Default::default()
        };
        assert_eq!(config.parse_label_order(), (LabelOrder::Shuffled, vec![]));
        assert_eq!(
            config.parse_message_visibility(),
            (MessageVisibility::Council, vec![])
        );
    }

    #[test]
    fn test_unknown_enum_falls_back_with_warning() {
        let config = FileDeliberationConfig {
            label_order: "alphabetical".to_string(),
            ..Default::default()
        };
        let (order, issues) = config.parse_label_order();
        assert_eq!(order, LabelOrder::Registry);
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
        assert!(issues[0].message.contains("alphabetical"));
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let config = FileDeliberationConfig {
            synthesis_timeout_seconds: 0,
            ..Default::default()
        };
        let issues = config.timeout_issues();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
        assert!(issues[0].message.contains("synthesis_timeout_seconds"));
    }
}
