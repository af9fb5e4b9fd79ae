//! Scripted gateway and fixtures shared by the use case tests.

use crate::ports::model_gateway::{GatewayError, ModelGateway, ModelReply};
use crate::ports::progress::ProgressNotifier;
use async_trait::async_trait;
use council_domain::{
    ActionInvocation, ActionSpec, Agent, AgentId, AgentRegistry, ChatMessage, Model, Stage,
    TurnWarning,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Scripted {
    Reply(ModelReply),
    Fail(String),
}

/// One recorded gateway call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub agent_id: String,
    pub messages: Vec<ChatMessage>,
    pub actions: Option<Vec<ActionSpec>>,
}

impl RecordedCall {
    /// All message contents joined, for substring assertions
    pub fn context(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n---\n")
    }
}

/// Mock gateway answering from per-agent scripts
///
/// Prompt rules (matched against the last message, latest rule first) win
/// over per-agent queues. A queue's last entry is reused once the others are consumed;
/// agents without a script answer `"<id> default"`.
pub struct ScriptedGateway {
    rules: Vec<(String, String, Scripted)>,
    queues: Mutex<HashMap<String, VecDeque<Scripted>>>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            queues: Mutex::new(HashMap::new()),
            delays: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn push(self, agent: &str, scripted: Scripted) -> Self {
        self.queues
            .lock()
            .unwrap()
            .entry(agent.to_string())
            .or_default()
            .push_back(scripted);
        self
    }

    pub fn reply(self, agent: &str, text: &str) -> Self {
        self.push(agent, Scripted::Reply(ModelReply::text(text)))
    }

    pub fn reply_with_actions(
        self,
        agent: &str,
        text: &str,
        invocations: Vec<ActionInvocation>,
    ) -> Self {
        self.push(
            agent,
            Scripted::Reply(ModelReply::text(text).with_invocations(invocations)),
        )
    }

    pub fn fail(self, agent: &str, reason: &str) -> Self {
        self.push(agent, Scripted::Fail(reason.to_string()))
    }

    /// Answer `agent` with `text` whenever its last message contains `needle`
    pub fn on_prompt(mut self, agent: &str, needle: &str, text: &str) -> Self {
        self.rules.push((
            agent.to_string(),
            needle.to_string(),
            Scripted::Reply(ModelReply::text(text)),
        ));
        self
    }

    /// Fail `agent` whenever its last message contains `needle`
    pub fn fail_on_prompt(mut self, agent: &str, needle: &str, reason: &str) -> Self {
        self.rules.push((
            agent.to_string(),
            needle.to_string(),
            Scripted::Fail(reason.to_string()),
        ));
        self
    }

    pub fn delay(mut self, agent: &str, delay: Duration) -> Self {
        self.delays.insert(agent.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, agent: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.agent_id == agent)
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next_scripted(&self, agent: &str, last_message: &str) -> Scripted {
        if let Some((_, _, scripted)) = self
            .rules
            .iter()
            .rev()
            .find(|(a, needle, _)| a == agent && last_message.contains(needle.as_str()))
        {
            return scripted.clone();
        }

        let mut queues = self.queues.lock().unwrap();
        match queues.get_mut(agent) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Scripted::Reply(ModelReply::text(format!("{agent} default"))),
        }
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn query(
        &self,
        agent: &Agent,
        messages: &[ChatMessage],
        actions: Option<&[ActionSpec]>,
    ) -> Result<ModelReply, GatewayError> {
        let id = agent.id.to_string();
        self.calls.lock().unwrap().push(RecordedCall {
            agent_id: id.clone(),
            messages: messages.to_vec(),
            actions: actions.map(|a| a.to_vec()),
        });

        if let Some(delay) = self.delays.get(&id) {
            tokio::time::sleep(*delay).await;
        }

        let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
        match self.next_scripted(&id, last) {
            Scripted::Reply(reply) => Ok(reply),
            Scripted::Fail(reason) => Err(GatewayError::RequestFailed(reason)),
        }
    }
}

/// Records stage and warning events
#[derive(Default)]
pub struct RecordingProgress {
    pub events: Mutex<Vec<String>>,
    pub warnings: Mutex<Vec<TurnWarning>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressNotifier for RecordingProgress {
    fn on_stage_start(&self, stage: &Stage, total_tasks: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("start {} ({})", stage.as_str(), total_tasks));
    }

    fn on_task_complete(&self, stage: &Stage, agent: &Agent, success: bool) {
        self.events
            .lock()
            .unwrap()
            .push(format!("done {} {} {}", stage.as_str(), agent.id, success));
    }

    fn on_stage_complete(&self, stage: &Stage) {
        self.events
            .lock()
            .unwrap()
            .push(format!("complete {}", stage.as_str()));
    }

    fn on_round_start(&self, round: usize, total_rounds: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("round {}/{}", round, total_rounds));
    }

    fn on_warning(&self, warning: &TurnWarning) {
        self.warnings.lock().unwrap().push(warning.clone());
    }
}

pub fn id(s: &str) -> AgentId {
    AgentId::new(s).unwrap()
}

/// Member whose display name is the capitalized id
pub fn agent(s: &str) -> Agent {
    let mut name = s.to_string();
    if let Some(first) = name.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    Agent::new(id(s), name, "Member", Model::default_model())
}

/// Registry of the given members plus a `chairman` synthesizer
pub fn registry(ids: &[&str]) -> AgentRegistry {
    AgentRegistry::new(ids.iter().map(|s| agent(s)).collect(), agent("chairman")).unwrap()
}
