//! Per-turn anonymization of ranked agents

use super::label::Label;
use crate::core::error::DomainError;
use crate::council::agent::AgentId;
use rand::Rng;
use rand::seq::SliceRandom;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

/// Matches label tokens such as `Response B` or `Response AA`
pub(crate) static LABEL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bResponse ([A-Z]+)\b").expect("label token regex should be valid")
});

/// How labels are assigned to agents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelOrder {
    /// Labels follow registry order: first ranked agent is `Response A`
    #[default]
    Registry,
    /// Agents are shuffled once per turn before labels are assigned
    Shuffled,
}

impl std::str::FromStr for LabelOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "registry" | "fixed" => Ok(LabelOrder::Registry),
            "shuffled" | "random" => Ok(LabelOrder::Shuffled),
            other => Err(format!("unknown label order: {}", other)),
        }
    }
}

/// Bijective mapping between anonymous labels and agent ids
///
/// Built once per turn, read-only afterwards. Entries are kept in label
/// order (`Response A` first).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnonymizationMap {
    entries: Vec<(Label, AgentId)>,
}

impl AnonymizationMap {
    /// Assign labels in the given order
    pub fn new(agents: impl IntoIterator<Item = AgentId>) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for (index, agent) in agents.into_iter().enumerate() {
            if !seen.insert(agent.clone()) {
                return Err(DomainError::DuplicateAgentId(agent.to_string()));
            }
            entries.push((Label::for_index(index), agent));
        }
        Ok(Self { entries })
    }

    /// Assign labels according to `order`, drawing from `rng` when shuffling
    pub fn build<R: Rng + ?Sized>(
        agents: impl IntoIterator<Item = AgentId>,
        order: LabelOrder,
        rng: &mut R,
    ) -> Result<Self, DomainError> {
        let mut agents: Vec<AgentId> = agents.into_iter().collect();
        if order == LabelOrder::Shuffled {
            agents.shuffle(rng);
        }
        Self::new(agents)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(label, agent)` pairs in label order
    pub fn entries(&self) -> impl Iterator<Item = (&Label, &AgentId)> {
        self.entries.iter().map(|(l, a)| (l, a))
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.entries.iter().map(|(l, _)| l)
    }

    pub fn label_for(&self, agent: &AgentId) -> Option<&Label> {
        self.entries
            .iter()
            .find(|(_, a)| a == agent)
            .map(|(l, _)| l)
    }

    pub fn agent_for(&self, label: &Label) -> Option<&AgentId> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, a)| a)
    }

    pub fn contains_label(&self, label: &Label) -> bool {
        self.agent_for(label).is_some()
    }

    /// Label string to agent id, for the caller-facing metadata
    pub fn to_label_map(&self) -> BTreeMap<String, AgentId> {
        self.entries
            .iter()
            .map(|(l, a)| (l.to_string(), a.clone()))
            .collect()
    }

    /// Rewrite every known label in `text` as `Response X (Name)`.
    ///
    /// Unknown labels are left untouched.
    pub fn deanonymize_text<F>(&self, text: &str, name_of: F) -> String
    where
        F: Fn(&AgentId) -> String,
    {
        LABEL_TOKEN
            .replace_all(text, |caps: &Captures| {
                let whole = caps[0].to_string();
                Label::from_letters(&caps[1])
                    .and_then(|label| self.agent_for(&label).map(|agent| (label, agent)))
                    .map(|(label, agent)| format!("{} ({})", label, name_of(agent)))
                    .unwrap_or(whole)
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ids(names: &[&str]) -> Vec<AgentId> {
        names.iter().map(|n| AgentId::new(*n).unwrap()).collect()
    }

    fn assert_bijective(map: &AnonymizationMap, agents: &[AgentId]) {
        assert_eq!(map.len(), agents.len());
        let labels: HashSet<_> = map.labels().collect();
        assert_eq!(labels.len(), agents.len());
        for agent in agents {
            let label = map.label_for(agent).unwrap();
            assert_eq!(map.agent_for(label), Some(agent));
        }
    }

    #[test]
    fn test_registry_order_is_deterministic() {
        let agents = ids(&["alice", "bob", "charlie"]);
        let map = AnonymizationMap::new(agents.clone()).unwrap();
        assert_bijective(&map, &agents);
        assert_eq!(map.label_for(&agents[0]).unwrap().as_str(), "Response A");
        assert_eq!(map.label_for(&agents[2]).unwrap().as_str(), "Response C");
    }

    #[test]
    fn test_shuffled_is_still_bijective() {
        let agents = ids(&["a1", "a2", "a3", "a4", "a5", "a6", "a7", "a8"]);
        let mut rng = StdRng::seed_from_u64(7);
        let map =
            AnonymizationMap::build(agents.clone(), LabelOrder::Shuffled, &mut rng).unwrap();
        assert_bijective(&map, &agents);
        // labels themselves are always assigned A, B, C... in entry order
        let labels: Vec<_> = map.labels().map(|l| l.to_string()).collect();
        assert_eq!(labels[0], "Response A");
        assert_eq!(labels[7], "Response H");
    }

    #[test]
    fn test_duplicate_agents_rejected() {
        assert!(AnonymizationMap::new(ids(&["alice", "alice"])).is_err());
    }

    #[test]
    fn test_label_map_for_metadata() {
        let map = AnonymizationMap::new(ids(&["bob", "alice"])).unwrap();
        let label_map = map.to_label_map();
        assert_eq!(label_map["Response A"].as_str(), "bob");
        assert_eq!(label_map["Response B"].as_str(), "alice");
    }

    #[test]
    fn test_deanonymize_text() {
        let map = AnonymizationMap::new(ids(&["alice", "bob"])).unwrap();
        let text = "Response B is stronger than Response A. Response C does not exist.";
        let out = map.deanonymize_text(text, |id| match id.as_str() {
            "alice" => "Alice".to_string(),
            _ => "Bob".to_string(),
        });
        assert_eq!(
            out,
            "Response B (Bob) is stronger than Response A (Alice). Response C does not exist."
        );
    }

    #[test]
    fn test_label_order_from_str() {
        assert_eq!("registry".parse::<LabelOrder>(), Ok(LabelOrder::Registry));
        assert_eq!("Shuffled".parse::<LabelOrder>(), Ok(LabelOrder::Shuffled));
        assert!("sideways".parse::<LabelOrder>().is_err());
    }
}
