//! Model value object representing the model an agent runs on

use super::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Reference to an LLM model (Value Object)
///
/// Council members talk to an OpenAI-compatible endpoint, so a model is just
/// the identifier that endpoint understands (e.g. `qwen/qwen3-1.7b`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Model(String);

impl Model {
    /// Create a model reference, rejecting blank identifiers
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidModel(name));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Model used by the default council
    pub fn default_model() -> Self {
        Self("qwen/qwen3-1.7b".to_string())
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::default_model()
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Model {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Model::new(s).map_err(serde::de::Error::custom)
    }
}
