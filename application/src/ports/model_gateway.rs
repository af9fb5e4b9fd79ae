//! Model gateway port
//!
//! Defines the single-agent query primitive every stage is built on.

use async_trait::async_trait;
use council_domain::{ActionInvocation, ActionSpec, Agent, ChatMessage};
use thiserror::Error;

/// Errors that can occur during model gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// What a model returned for one query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub text: String,
    /// Raw action invocations, decoded by the caller
    pub invocations: Vec<ActionInvocation>,
}

impl ModelReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            invocations: Vec::new(),
        }
    }

    pub fn with_invocations(mut self, invocations: Vec<ActionInvocation>) -> Self {
        self.invocations = invocations;
        self
    }
}

/// Gateway for querying one agent's model
///
/// Implementations (adapters) live in the infrastructure layer. The core
/// never retries; an adapter may throttle or retry on its own.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Send `messages` to `agent`'s model.
    ///
    /// `actions` lists the actions the model may invoke; `None` means a
    /// plain text completion.
    async fn query(
        &self,
        agent: &Agent,
        messages: &[ChatMessage],
        actions: Option<&[ActionSpec]>,
    ) -> Result<ModelReply, GatewayError>;
}
