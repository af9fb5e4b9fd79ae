//! Model endpoint configuration from TOML (`[gateway]` section)

use serde::{Deserialize, Serialize};

/// Default OpenAI-compatible chat completions endpoint (a local model server)
pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:1234/v1/chat/completions";

/// Raw gateway configuration from TOML
///
/// # Example
///
/// ```toml
/// [gateway]
/// url = "https://openrouter.ai/api/v1/chat/completions"
/// api_key_env = "OPENROUTER_API_KEY"
/// max_tokens = 700
/// request_timeout_seconds = 120
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGatewayConfig {
    /// Chat completions endpoint
    pub url: String,
    /// Environment variable holding the bearer token, if the endpoint needs one
    pub api_key_env: Option<String>,
    /// Completion budget per query
    pub max_tokens: u32,
    /// HTTP-level timeout; stage timeouts still apply on top of it
    pub request_timeout_seconds: Option<u64>,
}

impl Default for FileGatewayConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GATEWAY_URL.to_string(),
            api_key_env: None,
            max_tokens: 700,
            request_timeout_seconds: None,
        }
    }
}

impl FileGatewayConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.trim().is_empty())
    }
}
