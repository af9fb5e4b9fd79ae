//! Extraction of a ranking from free-form evaluation text

use super::anonymizer::{AnonymizationMap, LABEL_TOKEN};
use super::label::Label;
use crate::council::agent::AgentId;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Section marker evaluators are asked to put before their ordered list
pub const FINAL_RANKING_MARKER: &str = "FINAL RANKING:";

/// Numbered entries: `1. Response C`, `2) **Response A**`
static NUMBERED_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+[.)]\s*(?:\*\*)?\s*Response ([A-Z]+)\b")
        .expect("numbered entry regex should be valid")
});

/// One evaluator's ranking of the anonymized responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranking {
    pub evaluator_agent_id: AgentId,
    /// The evaluation exactly as the model returned it
    pub raw_text: String,
    /// Best first; never longer than the number of ranked agents
    pub parsed_order: Vec<Label>,
    pub is_valid: bool,
    /// Set when the evaluator's query itself failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ranking {
    /// Ranking slot for an evaluator whose query failed
    pub fn failed(evaluator: AgentId, error: impl Into<String>) -> Self {
        Self {
            evaluator_agent_id: evaluator,
            raw_text: String::new(),
            parsed_order: Vec::new(),
            is_valid: false,
            error: Some(error.into()),
        }
    }

    /// 1-based position of `label`, if this ranking mentions it
    pub fn position_of(&self, label: &Label) -> Option<usize> {
        self.parsed_order
            .iter()
            .position(|l| l == label)
            .map(|i| i + 1)
    }
}

/// Parse an evaluation into a [`Ranking`].
///
/// Looks for the last `FINAL RANKING:` section and reads its numbered list.
/// When the section is missing or has no numbered entries, falls back to
/// label mentions in order of first appearance: first inside the section,
/// then across the whole text. Labels outside `map` are ignored and repeats
/// keep their first position.
pub fn parse_ranking(
    evaluator: AgentId,
    raw_text: impl Into<String>,
    map: &AnonymizationMap,
) -> Ranking {
    let raw_text = raw_text.into();
    let parsed_order = extract_order(&raw_text, map);
    Ranking {
        evaluator_agent_id: evaluator,
        is_valid: !parsed_order.is_empty(),
        parsed_order,
        raw_text,
        error: None,
    }
}

fn extract_order(text: &str, map: &AnonymizationMap) -> Vec<Label> {
    if let Some(index) = text.rfind(FINAL_RANKING_MARKER) {
        let section = &text[index + FINAL_RANKING_MARKER.len()..];

        let numbered = collect(&NUMBERED_ENTRY, section, map);
        if !numbered.is_empty() {
            return numbered;
        }

        let mentioned = collect(&LABEL_TOKEN, section, map);
        if !mentioned.is_empty() {
            return mentioned;
        }
    }

    collect(&LABEL_TOKEN, text, map)
}

fn collect(pattern: &Regex, text: &str, map: &AnonymizationMap) -> Vec<Label> {
    let mut seen = HashSet::new();
    pattern
        .captures_iter(text)
        .filter_map(|caps| Label::from_letters(&caps[1]))
        .filter(|label| map.contains_label(label))
        .filter(|label| seen.insert(label.clone()))
        .take(map.len())
        .collect()
}
