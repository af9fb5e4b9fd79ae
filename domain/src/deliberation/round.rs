//! Collaboration round record

use super::message::{Message, RejectedAction};
use super::response::AgentResponse;
use crate::council::agent::AgentId;
use serde::{Deserialize, Serialize};

/// One completed Stage 2 round
///
/// `responses` is in registry order; `deliveries` holds the messages emitted
/// in this round, visible to agents from the next round on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationRound {
    pub round_number: usize,
    pub responses: Vec<AgentResponse>,
    pub deliveries: Vec<Message>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedAction>,
}

impl CollaborationRound {
    pub fn response_of(&self, agent_id: &AgentId) -> Option<&AgentResponse> {
        self.responses.iter().find(|r| &r.agent_id == agent_id)
    }

    /// Messages addressed to the given agent
    pub fn inbox<'a>(&'a self, agent_id: &'a AgentId) -> impl Iterator<Item = &'a Message> {
        self.deliveries
            .iter()
            .filter(move |m| &m.to_agent_id == agent_id)
    }

    /// Messages the given agent sent or received
    pub fn involving<'a>(&'a self, agent_id: &'a AgentId) -> impl Iterator<Item = &'a Message> {
        self.deliveries
            .iter()
            .filter(move |m| &m.to_agent_id == agent_id || &m.from_agent_id == agent_id)
    }

    pub fn failure_count(&self) -> usize {
        self.responses.iter().filter(|r| r.is_failure).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> AgentId {
        AgentId::new(s).unwrap()
    }

    fn msg(from: &str, to: &str) -> Message {
        Message {
            from_agent_id: id(from),
            to_agent_id: id(to),
            round_number: 1,
            text: format!("{from} to {to}"),
        }
    }

    #[test]
    fn test_inbox_and_involving() {
        let round = CollaborationRound {
            round_number: 1,
            responses: vec![
                AgentResponse::success(id("alice"), "a"),
                AgentResponse::failure(id("bob"), "x"),
            ],
            deliveries: vec![msg("alice", "bob"), msg("bob", "charlie"), msg("charlie", "alice")],
            rejected: vec![],
        };

        let bob = id("bob");
        let inbox: Vec<_> = round.inbox(&bob).map(|m| m.text.as_str()).collect();
        assert_eq!(inbox, vec!["alice to bob"]);

        let involving: Vec<_> = round.involving(&bob).map(|m| m.text.as_str()).collect();
        assert_eq!(involving, vec!["alice to bob", "bob to charlie"]);

        assert_eq!(round.failure_count(), 1);
        assert_eq!(round.response_of(&id("alice")).unwrap().text, "a");
    }
}
