//! Agent entity

use crate::core::error::DomainError;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// Stable identifier of a council member (e.g. `"alice"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentId(pub(crate) String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() || id.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidAgentId(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for AgentId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        AgentId::new(s)
    }
}

impl From<AgentId> for String {
    fn from(id: AgentId) -> Self {
        id.0
    }
}

/// A council member (Entity)
///
/// Created once at startup and shared read-only by every stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    /// Name used in prompts and when peers address this agent
    pub display_name: String,
    /// Short personality descriptor (e.g. "analytical and methodical")
    pub personality: String,
    #[serde(default)]
    pub traits: Vec<String>,
    /// Role on the council (e.g. "Analyst - breaks down problems systematically")
    pub role: String,
    pub model: Model,
}

impl Agent {
    pub fn new(
        id: AgentId,
        display_name: impl Into<String>,
        role: impl Into<String>,
        model: Model,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            personality: String::new(),
            traits: Vec::new(),
            role: role.into(),
            model,
        }
    }

    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = personality.into();
        self
    }

    pub fn with_traits<I, S>(mut self, traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.traits = traits.into_iter().map(Into::into).collect();
        self
    }

    /// `"Alice (Analyst - ...)"`, used when attributing responses in prompts
    pub fn attribution(&self) -> String {
        if self.role.is_empty() {
            self.display_name.clone()
        } else {
            format!("{} ({})", self.display_name, self.role)
        }
    }
}
