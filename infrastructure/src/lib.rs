//! Infrastructure layer for llm-council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod openai;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigIssue, ConfigLoader, ConfigValidationError, FileConfig, FileCouncilConfig,
    FileDeliberationConfig, FileGatewayConfig, FileMemberConfig, FileOutputConfig,
    FileOutputFormat, FileReplConfig, FileStorageConfig, Severity,
};
pub use openai::gateway::OpenAiGateway;
pub use storage::JsonlConversationStore;
