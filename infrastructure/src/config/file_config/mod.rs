//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into the registry and
//! deliberation parameters at startup.

mod council;
mod deliberation;
mod gateway;
mod issue;
mod output;
mod repl;
mod storage;

pub use council::{FileCouncilConfig, FileMemberConfig};
pub use deliberation::FileDeliberationConfig;
pub use gateway::{DEFAULT_GATEWAY_URL, FileGatewayConfig};
pub use issue::{ConfigIssue, ConfigIssueCode, Severity};
pub use output::{FileOutputConfig, FileOutputFormat};
pub use repl::FileReplConfig;
pub use storage::FileStorageConfig;

use council_application::CouncilParams;
use council_domain::{AgentRegistry, DomainError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration that cannot be turned into a runnable council
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{0} cannot be 0")]
    ZeroTimeout(&'static str),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Model endpoint settings
    pub gateway: FileGatewayConfig,
    /// Rounds, timeouts and anonymization
    pub deliberation: FileDeliberationConfig,
    /// Members and chairman
    pub council: FileCouncilConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Conversation persistence
    pub storage: FileStorageConfig,
    /// REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Warnings fall back to defaults; errors make [`to_registry`] or
    /// [`to_params`] fail.
    ///
    /// [`to_registry`]: Self::to_registry
    /// [`to_params`]: Self::to_params
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.gateway.url.trim().is_empty() {
            issues.push(ConfigIssue::empty_value("gateway.url"));
        }

        issues.extend(self.deliberation.parse_label_order().1);
        issues.extend(self.deliberation.parse_message_visibility().1);
        issues.extend(self.deliberation.timeout_issues());
        issues.extend(self.council.issues());

        if self.storage.enabled && self.storage.data_dir.trim().is_empty() {
            issues.push(ConfigIssue::empty_value("storage.data_dir"));
        }

        issues
    }

    pub fn to_registry(&self) -> Result<AgentRegistry, ConfigValidationError> {
        self.council.to_registry()
    }

    pub fn to_params(&self) -> Result<CouncilParams, ConfigValidationError> {
        let d = &self.deliberation;
        let secs = |field: &'static str, value: u64| {
            if value == 0 {
                Err(ConfigValidationError::ZeroTimeout(field))
            } else {
                Ok(Duration::from_secs(value))
            }
        };

        let mut params = CouncilParams::default()
            .with_rounds(d.rounds)
            .with_agent_timeout(secs("agent_timeout_seconds", d.agent_timeout_seconds)?)
            .with_synthesis_timeout(secs(
                "synthesis_timeout_seconds",
                d.synthesis_timeout_seconds,
            )?)
            .with_title_timeout(secs("title_timeout_seconds", d.title_timeout_seconds)?)
            .with_label_order(d.parse_label_order().0)
            .with_message_visibility(d.parse_message_visibility().0)
            .with_transcript_in_ranking(d.include_transcript_in_ranking);
        if let Some(seed) = d.label_seed {
            params = params.with_label_seed(seed);
        }
        Ok(params)
    }
}

/// Expand a leading `~/` to the home directory
pub(crate) fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
