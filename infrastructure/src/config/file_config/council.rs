//! Council roster from TOML (`[council]` section)

use super::ConfigValidationError;
use super::issue::{ConfigIssue, ConfigIssueCode, Severity};
use council_domain::{Agent, AgentId, AgentRegistry, Model, ambiguous_name};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One council member (or the chairman) from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMemberConfig {
    /// Stable id, also accepted as a message recipient
    pub id: String,
    /// Display name; defaults to the id
    pub name: Option<String>,
    pub role: String,
    pub personality: String,
    pub traits: Vec<String>,
    /// Model for this member; defaults to `council.model`
    pub model: Option<String>,
}

impl FileMemberConfig {
    /// Name the member is addressed by: `name`, or the id when unset
    fn effective_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.id.trim())
    }

    fn to_agent(&self, default_model: &Model) -> Result<Agent, ConfigValidationError> {
        let id = AgentId::new(self.id.trim())?;
        let name = self.effective_name().to_string();
        let model = match &self.model {
            Some(model) => Model::new(model)?,
            None => default_model.clone(),
        };

        Ok(Agent::new(id, name, self.role.clone(), model)
            .with_personality(self.personality.clone())
            .with_traits(self.traits.clone()))
    }
}

/// Raw council configuration from TOML
///
/// An empty member list means the built-in three-member council.
///
/// # Example
///
/// ```toml
/// [council]
/// model = "qwen/qwen3-1.7b"
///
/// [[council.members]]
/// id = "alice"
/// name = "Alice"
/// role = "Analyst - breaks down problems systematically"
/// personality = "analytical and methodical"
/// traits = ["logical", "detail-oriented", "skeptical"]
///
/// [council.chairman]
/// id = "chairman"
/// model = "qwen/qwen3-8b"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    /// Default model for every agent without its own
    pub model: Option<String>,
    pub members: Vec<FileMemberConfig>,
    pub chairman: Option<FileMemberConfig>,
}

impl FileCouncilConfig {
    fn default_model(&self) -> Result<Model, ConfigValidationError> {
        match &self.model {
            Some(model) => Ok(Model::new(model)?),
            None => Ok(Model::default_model()),
        }
    }

    /// Build the immutable registry
    pub fn to_registry(&self) -> Result<AgentRegistry, ConfigValidationError> {
        let model = self.default_model()?;
        let builtin = AgentRegistry::default_council();

        let members = if self.members.is_empty() {
            builtin
                .members()
                .iter()
                .cloned()
                .map(|mut agent| {
                    agent.model = model.clone();
                    agent
                })
                .collect()
        } else {
            self.members
                .iter()
                .map(|m| m.to_agent(&model))
                .collect::<Result<Vec<_>, _>>()?
        };

        let chairman = match &self.chairman {
            Some(chairman) => chairman.to_agent(&model)?,
            None => {
                let mut agent = builtin.synthesizer().clone();
                agent.model = model;
                agent
            }
        };

        Ok(AgentRegistry::new(members, chairman)?)
    }

    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if let Some(model) = &self.model
            && model.trim().is_empty()
        {
            issues.push(ConfigIssue::empty_value("council.model"));
        }

        let mut seen = HashSet::new();
        let mut addressable = Vec::new();
        for (i, member) in self.members.iter().enumerate() {
            let id = member.id.trim();
            if id.is_empty() {
                issues.push(ConfigIssue::empty_value(&format!("council.members[{}].id", i)));
            } else if seen.insert(id) {
                addressable.push((id, member.effective_name()));
            } else {
                issues.push(ConfigIssue {
                    severity: Severity::Error,
                    code: ConfigIssueCode::DuplicateMember { id: id.to_string() },
                    message: format!("council.members: duplicate id '{}'", id),
                });
            }
            if let Some(model) = &member.model
                && model.trim().is_empty()
            {
                issues.push(ConfigIssue::empty_value(&format!(
                    "council.members[{}].model",
                    i
                )));
            }
        }

        if let Some(name) = ambiguous_name(addressable) {
            issues.push(ConfigIssue {
                severity: Severity::Error,
                message: format!(
                    "council.members: name '{}' clashes with another member's name or id",
                    name
                ),
                code: ConfigIssueCode::AmbiguousName { name },
            });
        }

        if let Some(chairman) = &self.chairman
            && chairman.id.trim().is_empty()
        {
            issues.push(ConfigIssue::empty_value("council.chairman.id"));
        }

        issues
    }
}
