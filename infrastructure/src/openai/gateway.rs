//! HTTP model gateway

use super::protocol::{ChatCompletionRequest, ChatCompletionResponse};
use crate::config::FileGatewayConfig;
use async_trait::async_trait;
use council_application::{GatewayError, ModelGateway, ModelReply};
use council_domain::{ActionSpec, Agent, ChatMessage};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

/// Longest error body echoed back in a [`GatewayError`]
const MAX_ERROR_BODY: usize = 300;

/// [`ModelGateway`] for OpenAI-compatible chat completions endpoints
///
/// Each query is one stateless POST; the agent's model is sent as the
/// `model` field. No retries.
pub struct OpenAiGateway {
    client: Client,
    url: String,
    api_key: Option<String>,
    max_tokens: u32,
}

impl OpenAiGateway {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            api_key: None,
            max_tokens: 700,
        }
    }

    /// Build from the `[gateway]` config section
    pub fn from_config(config: &FileGatewayConfig) -> Result<Self, GatewayError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        info!("Model gateway: {}", config.url);

        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key(),
            max_tokens: config.max_tokens,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ModelGateway for OpenAiGateway {
    async fn query(
        &self,
        agent: &Agent,
        messages: &[ChatMessage],
        actions: Option<&[ActionSpec]>,
    ) -> Result<ModelReply, GatewayError> {
        let body =
            ChatCompletionRequest::new(agent.model.as_str(), messages, actions, self.max_tokens);
        debug!(
            "POST {} for {} ({} messages, tools: {})",
            self.url,
            agent.id,
            messages.len(),
            body.tools.is_some()
        );

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, agent, &text));
        }

        let decoded: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        let reply = decoded.into_reply()?;

        debug!(
            "{} replied ({} chars, {} invocations)",
            agent.id,
            reply.text.len(),
            reply.invocations.len()
        );
        Ok(reply)
    }
}

fn map_send_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

fn status_error(status: StatusCode, agent: &Agent, body: &str) -> GatewayError {
    let body = council_domain::core::string::truncate(body.trim(), MAX_ERROR_BODY);
    match status {
        StatusCode::NOT_FOUND => {
            GatewayError::ModelNotAvailable(format!("{} ({})", agent.model, body))
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GatewayError::Timeout,
        _ => GatewayError::RequestFailed(format!("HTTP {}: {}", status, body)),
    }
}
