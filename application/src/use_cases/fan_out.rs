//! Concurrent per-agent queries with a barrier.
//!
//! Every stage that talks to more than one agent goes through
//! [`fan_out`]: one task per agent on a `JoinSet`, each bounded by the
//! per-agent timeout, results slotted back into input order. A slow or
//! failing agent only loses its own slot. Turn-level cancellation aborts
//! every outstanding task.

use crate::ports::model_gateway::{GatewayError, ModelGateway, ModelReply};
use crate::ports::progress::ProgressNotifier;
use crate::use_cases::shared::Cancelled;
use council_domain::{ActionSpec, Agent, ChatMessage, Stage};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// One agent's query, with its context already built
///
/// Each request owns its messages, so concurrent tasks never share
/// mutable state.
#[derive(Debug, Clone)]
pub(crate) struct AgentQuery {
    pub agent: Agent,
    pub messages: Vec<ChatMessage>,
    pub actions: Option<Vec<ActionSpec>>,
}

impl AgentQuery {
    pub fn new(agent: Agent, messages: Vec<ChatMessage>) -> Self {
        Self {
            agent,
            messages,
            actions: None,
        }
    }

    pub fn with_actions(mut self, actions: Vec<ActionSpec>) -> Self {
        self.actions = Some(actions);
        self
    }
}

/// Run all queries concurrently and wait for every one to resolve.
///
/// Returns one outcome per query, in input order. `Err` carries the
/// failure reason (gateway error, timeout, or an aborted task).
pub(crate) async fn fan_out<G: ModelGateway + 'static>(
    gateway: &Arc<G>,
    stage: Stage,
    queries: Vec<AgentQuery>,
    timeout: Duration,
    cancel: &CancellationToken,
    progress: &dyn ProgressNotifier,
) -> Result<Vec<Result<ModelReply, String>>, Cancelled> {
    if cancel.is_cancelled() {
        return Err(Cancelled);
    }

    let agents: Vec<Agent> = queries.iter().map(|q| q.agent.clone()).collect();
    let mut join_set = JoinSet::new();

    for (index, query) in queries.into_iter().enumerate() {
        let gateway = Arc::clone(gateway);

        join_set.spawn(async move {
            let request = gateway.query(&query.agent, &query.messages, query.actions.as_deref());
            let outcome = match tokio::time::timeout(timeout, request).await {
                Ok(Ok(reply)) => Ok(reply),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err(format!(
                    "{} after {}s",
                    GatewayError::Timeout,
                    timeout.as_secs_f32()
                )),
            };
            (index, outcome)
        });
    }

    let mut slots: Vec<Option<Result<ModelReply, String>>> = vec![None; agents.len()];

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("{} cancelled with {} task(s) outstanding", stage, join_set.len());
                join_set.abort_all();
                return Err(Cancelled);
            }

            next = join_set.join_next() => {
                let Some(joined) = next else { break };
                match joined {
                    Ok((index, outcome)) => {
                        let agent = &agents[index];
                        match &outcome {
                            Ok(_) => debug!("{} responded", agent.id),
                            Err(e) => warn!("{} failed: {}", agent.id, e),
                        }
                        progress.on_task_complete(&stage, agent, outcome.is_ok());
                        slots[index] = Some(outcome);
                    }
                    Err(e) => {
                        // The slot is unknown here; it is reported once all tasks are in
                        warn!("Task join error: {}", e);
                    }
                }
            }
        }
    }

    Ok(slots
        .into_iter()
        .zip(&agents)
        .map(|(slot, agent)| {
            slot.unwrap_or_else(|| {
                progress.on_task_complete(&stage, agent, false);
                Err("task aborted".to_string())
            })
        })
        .collect())
}
