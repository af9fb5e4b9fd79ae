//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No council members configured")]
    NoMembers,

    #[error("Duplicate agent id: {0}")]
    DuplicateAgentId(String),

    #[error("Ambiguous member name: {0} (names and ids must be distinct, ignoring case)")]
    AmbiguousMemberName(String),

    #[error("Invalid agent id: {0:?}")]
    InvalidAgentId(String),

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Invalid model reference: {0:?}")]
    InvalidModel(String),
}
