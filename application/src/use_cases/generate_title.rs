//! Conversation title generation
//!
//! A short title for the first turn of a conversation. Never fatal: any
//! failure falls back to [`FALLBACK_TITLE`].

use crate::ports::model_gateway::ModelGateway;
use council_domain::core::string::{strip_quotes, truncate};
use council_domain::{Agent, ChatMessage, CouncilPromptTemplate};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub const FALLBACK_TITLE: &str = "New Conversation";

const MAX_TITLE_LEN: usize = 50;

/// Asks one agent for a 3-5 word summary of the question
pub struct TitleGenerator<G: ModelGateway + 'static> {
    gateway: Arc<G>,
    agent: Agent,
    timeout: Duration,
}

impl<G: ModelGateway + 'static> TitleGenerator<G> {
    pub fn new(gateway: Arc<G>, agent: Agent, timeout: Duration) -> Self {
        Self {
            gateway,
            agent,
            timeout,
        }
    }

    pub async fn generate(&self, question: &str, cancel: &CancellationToken) -> String {
        let messages = [ChatMessage::user(CouncilPromptTemplate::title_prompt(question))];
        let request = self.gateway.query(&self.agent, &messages, None);

        let reply = tokio::select! {
            _ = cancel.cancelled() => return FALLBACK_TITLE.to_string(),
            reply = tokio::time::timeout(self.timeout, request) => reply,
        };

        match reply {
            Ok(Ok(reply)) => {
                let title = clean_title(&reply.text);
                debug!("Generated title: {}", title);
                title
            }
            Ok(Err(e)) => {
                warn!("Title generation failed: {}", e);
                FALLBACK_TITLE.to_string()
            }
            Err(_) => {
                warn!("Title generation timed out");
                FALLBACK_TITLE.to_string()
            }
        }
    }
}

/// Lead-in lines such as "Sure!" or "Here is a title:"
fn is_preamble(line: &str) -> bool {
    const LEAD_INS: [&str; 5] = ["sure", "here", "okay", "certainly", "of course"];
    let lower = line.to_lowercase();
    line.ends_with(':')
        || LEAD_INS.iter().any(|p| {
            lower
                .strip_prefix(p)
                .is_some_and(|rest| !rest.starts_with(char::is_alphabetic))
        })
}

/// Strip quotes and cap the length of a model-written title
pub fn clean_title(raw: &str) -> String {
    // The title is the first line that is not a lead-in; later lines are
    // usually explanations
    let mut lines = raw.lines().map(str::trim).filter(|l| !l.is_empty());
    let line = lines
        .clone()
        .find(|l| !is_preamble(l))
        .or_else(|| lines.next())
        .unwrap_or("");
    let title = strip_quotes(line.strip_prefix("Title:").unwrap_or(line));
    if title.is_empty() {
        return FALLBACK_TITLE.to_string();
    }
    truncate(title, MAX_TITLE_LEN)
}
