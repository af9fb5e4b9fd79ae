//! Configuration file loading for llm-council
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `COUNCIL_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./council.toml` or `./.council.toml`
//! 4. Global: `$XDG_CONFIG_HOME/llm-council/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, ConfigIssueCode, ConfigValidationError, DEFAULT_GATEWAY_URL, FileConfig,
    FileCouncilConfig, FileDeliberationConfig, FileGatewayConfig, FileMemberConfig,
    FileOutputConfig, FileOutputFormat, FileReplConfig, FileStorageConfig, Severity,
};
pub use loader::ConfigLoader;
