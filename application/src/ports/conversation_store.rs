//! Port for persisting finished council turns.
//!
//! The core hands every successful turn's stage bundle to a
//! [`ConversationStore`] and otherwise stays agnostic of the storage
//! format. Storage failures never fail a turn: callers log and move on.

use chrono::{DateTime, Utc};
use council_domain::StageBundle;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a conversation store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid conversation id: {0}")]
    InvalidId(String),
}

/// One persisted turn of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub conversation_id: String,
    pub timestamp: DateTime<Utc>,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub bundle: StageBundle,
}

impl TurnRecord {
    /// Record stamped with the current UTC time
    pub fn new(
        conversation_id: impl Into<String>,
        question: impl Into<String>,
        title: Option<String>,
        bundle: StageBundle,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            timestamp: Utc::now(),
            question: question.into(),
            title,
            bundle,
        }
    }
}

/// Port for storing council turns.
///
/// Intentionally synchronous, like a log sink: turns are appended once,
/// after the last stage, and never modified.
pub trait ConversationStore: Send + Sync {
    /// Append a finished turn to its conversation
    fn append(&self, record: &TurnRecord) -> Result<(), StoreError>;

    /// All turns of a conversation, oldest first; empty when unknown
    fn load(&self, conversation_id: &str) -> Result<Vec<TurnRecord>, StoreError>;
}

/// No-op implementation for tests and when storage is disabled.
pub struct NoConversationStore;

impl ConversationStore for NoConversationStore {
    fn append(&self, _record: &TurnRecord) -> Result<(), StoreError> {
        Ok(())
    }

    fn load(&self, _conversation_id: &str) -> Result<Vec<TurnRecord>, StoreError> {
        Ok(Vec::new())
    }
}
