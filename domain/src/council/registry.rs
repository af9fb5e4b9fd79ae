//! Agent registry: the immutable council roster

use super::agent::{Agent, AgentId};
use crate::core::error::DomainError;
use crate::core::model::Model;
use std::collections::HashSet;

/// The council roster (Entity)
///
/// Holds the ordered list of members plus the designated synthesizer.
/// Built once at startup; never mutated afterwards, so it can be shared
/// across concurrent queries behind an `Arc` without locking.
///
/// Invariants: at least one member, member ids unique, and every display
/// name addresses exactly one member (no two names equal ignoring case, no
/// name equal to another member's id).
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    members: Vec<Agent>,
    synthesizer: Agent,
}

impl AgentRegistry {
    pub fn new(members: Vec<Agent>, synthesizer: Agent) -> Result<Self, DomainError> {
        if members.is_empty() {
            return Err(DomainError::NoMembers);
        }

        let mut seen = HashSet::new();
        for member in &members {
            if !seen.insert(member.id.as_str()) {
                return Err(DomainError::DuplicateAgentId(member.id.to_string()));
            }
        }
        if let Some(name) = ambiguous_name(
            members
                .iter()
                .map(|a| (a.id.as_str(), a.display_name.as_str())),
        ) {
            return Err(DomainError::AmbiguousMemberName(name));
        }

        Ok(Self {
            members,
            synthesizer,
        })
    }

    /// Members in registry order
    pub fn members(&self) -> &[Agent] {
        &self.members
    }

    pub fn synthesizer(&self) -> &Agent {
        &self.synthesizer
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, id: &AgentId) -> Option<&Agent> {
        self.members.iter().find(|a| &a.id == id)
    }

    /// Display name for an id, falling back to the raw id
    pub fn display_name<'a>(&'a self, id: &'a AgentId) -> &'a str {
        self.get(id).map(|a| a.display_name.as_str()).unwrap_or(id.as_str())
    }

    /// Resolve a recipient as written by a model.
    ///
    /// Accepts an exact member id, or a display name compared
    /// case-insensitively, since models address peers by name.
    pub fn resolve(&self, recipient: &str) -> Option<&Agent> {
        let recipient = recipient.trim();
        self.members
            .iter()
            .find(|a| a.id.as_str() == recipient)
            .or_else(|| {
                self.members
                    .iter()
                    .find(|a| a.display_name.trim().eq_ignore_ascii_case(recipient))
            })
    }

    /// The three-member council used when nothing is configured
    pub fn default_council() -> Self {
        let model = Model::default_model();
        let member = |id: &str, name: &str, personality: &str, traits: [&str; 3], role: &str| {
            Agent {
                id: AgentId(id.to_string()),
                display_name: name.to_string(),
                personality: personality.to_string(),
                traits: traits.iter().map(|t| t.to_string()).collect(),
                role: role.to_string(),
                model: model.clone(),
            }
        };

        Self {
            members: vec![
                member(
                    "alice",
                    "Alice",
                    "analytical and methodical",
                    ["logical", "detail-oriented", "skeptical"],
                    "Analyst - breaks down problems systematically",
                ),
                member(
                    "bob",
                    "Bob",
                    "creative and enthusiastic",
                    ["imaginative", "optimistic", "spontaneous"],
                    "Innovator - generates creative solutions",
                ),
                member(
                    "charlie",
                    "Charlie",
                    "diplomatic and balanced",
                    ["empathetic", "fair-minded", "collaborative"],
                    "Coordinator - synthesizes different perspectives",
                ),
            ],
            synthesizer: Agent {
                id: AgentId("chairman".to_string()),
                display_name: "Chairman".to_string(),
                personality: String::new(),
                traits: Vec::new(),
                role: "Chairman - synthesizes the council's final answer".to_string(),
                model,
            },
        }
    }
}

/// First display name that would not resolve to exactly one member.
///
/// Takes `(id, display_name)` pairs with unique ids. A name clashes when it
/// equals another member's name or another member's id, ignoring ASCII case.
pub fn ambiguous_name<'a>(members: impl IntoIterator<Item = (&'a str, &'a str)>) -> Option<String> {
    let members: Vec<(&str, &str)> = members.into_iter().collect();
    let mut names = HashSet::new();
    for (id, name) in &members {
        let key = name.trim().to_ascii_lowercase();
        let clashes_with_id = members
            .iter()
            .any(|(other, _)| other != id && other.eq_ignore_ascii_case(&key));
        if !names.insert(key) || clashes_with_id {
            return Some(name.trim().to_string());
        }
    }
    None
}
