//! Conversation storage configuration from TOML (`[storage]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw storage configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Persist finished turns
    pub enabled: bool,
    /// Directory holding one JSONL file per conversation
    pub data_dir: String,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            data_dir: "data/conversations".to_string(),
        }
    }
}

impl FileStorageConfig {
    /// Data directory with a leading `~` expanded
    pub fn data_dir(&self) -> PathBuf {
        super::expand_home(&self.data_dir)
    }
}
