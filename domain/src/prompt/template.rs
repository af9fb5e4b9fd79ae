//! Prompt templates for the council stages

use crate::council::agent::{Agent, AgentId};
use crate::deliberation::round::CollaborationRound;
use crate::ranking::parsing::FINAL_RANKING_MARKER;

/// Templates for generating prompts at each stage
pub struct CouncilPromptTemplate;

impl CouncilPromptTemplate {
    fn persona(agent: &Agent) -> String {
        format!(
            "You are {}, a council member in a multi-model deliberation system.\n\n\
             Role: {}\nPersonality: {}\nTraits: {}",
            agent.display_name,
            agent.role,
            agent.personality,
            agent.traits.join(", ")
        )
    }

    /// System prompt for a member answering on its own (Stage 1)
    pub fn member_system(agent: &Agent) -> String {
        format!(
            "{}\n\nAnswer from your own perspective and stay in character.",
            Self::persona(agent)
        )
    }

    /// User prompt for Stage 1
    pub fn initial_query(question: &str) -> String {
        format!(
            "{}\n\nIMPORTANT: Keep your response to ONE paragraph only (4 sentences). Be concise and direct.",
            question
        )
    }

    /// System prompt for the collaboration rounds (Stage 2)
    pub fn collaboration_system(agent: &Agent) -> String {
        format!(
            r#"{}

You are now in the COLLABORATION stage. You've seen everyone's initial responses to the user's question.
Your goal is to engage with other council members to refine and improve the collective understanding.

Use the send_message tool to:
- Share insights or critiques about other members' responses
- Ask clarifying questions
- Build on ideas you find compelling
- Point out potential issues or gaps

Messages you send are delivered when the current round ends.
Be constructive and stay in character. Limit your messages to 2-3 sentences each."#,
            Self::persona(agent)
        )
    }

    /// Opening context for round 1: the question and every Stage 1 answer
    ///
    /// `responses` pairs an attribution ("Alice (Analyst)") with its text.
    pub fn collaboration_context(question: &str, responses: &[(String, String)]) -> String {
        let responses_text = responses
            .iter()
            .map(|(who, text)| format!("{}:\n{}", who, text))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            r#"Original Question: {}

Here are all the initial responses from the council:

{}

Review these responses and decide if you want to engage with other council members. You can use the send_message tool to communicate with them."#,
            question, responses_text
        )
    }

    /// Prompt that opens every round after the first
    pub fn continue_discussion() -> &'static str {
        "Continue the discussion if you have more to contribute."
    }

    /// Messages delivered to a member at the end of a round
    ///
    /// `messages` pairs the sender's display name with the message text.
    pub fn delivered_messages(round_number: usize, messages: &[(String, String)]) -> String {
        if messages.is_empty() {
            return format!("No messages were delivered to you in round {}.", round_number);
        }

        let mut prompt = format!("Messages delivered to you after round {}:\n", round_number);
        for (from, text) in messages {
            prompt.push_str(&format!("\nFrom {}: {}", from, text));
        }
        prompt
    }

    /// Render a collaboration transcript, one block per round.
    ///
    /// `name_of` decides how agents are named: display names for the
    /// synthesizer, anonymous labels for evaluators.
    pub fn transcript<F>(rounds: &[CollaborationRound], name_of: F) -> String
    where
        F: Fn(&AgentId) -> String,
    {
        let mut out = String::new();
        for round in rounds {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("Round {}:\n", round.round_number));

            for response in &round.responses {
                let name = name_of(&response.agent_id);
                match (response.is_failure, response.remark()) {
                    (true, _) => out.push_str(&format!("{}: [no response]\n", name)),
                    (false, Some(remark)) => out.push_str(&format!("{}: {}\n", name, remark)),
                    (false, None) => {}
                }
            }

            for message in &round.deliveries {
                out.push_str(&format!(
                    "{} -> {}: {}\n",
                    name_of(&message.from_agent_id),
                    name_of(&message.to_agent_id),
                    message.text
                ));
            }
        }
        out
    }

    /// User prompt for a peer evaluator (Stage 3)
    ///
    /// `responses` pairs an anonymous label with the response text. The
    /// optional transcript must already use labels instead of names.
    pub fn ranking_prompt(
        question: &str,
        responses: &[(String, String)],
        transcript: Option<&str>,
    ) -> String {
        let responses_text = responses
            .iter()
            .map(|(label, text)| format!("{}:\n{}", label, text))
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut prompt = format!(
            r#"You are evaluating different responses to the following question:

Question: {}

Here are the responses from different models (anonymized):

{}
"#,
            question, responses_text
        );

        if let Some(transcript) = transcript.filter(|t| !t.trim().is_empty()) {
            prompt.push_str(&format!(
                "\nThe authors then discussed their answers (names replaced by labels):\n\n{}\n",
                transcript.trim_end()
            ));
        }

        let example = responses
            .iter()
            .rev()
            .enumerate()
            .map(|(i, (label, _))| format!("{}. {}", i + 1, label))
            .collect::<Vec<_>>()
            .join("\n");

        prompt.push_str(&format!(
            r#"
Your task:
1. First, evaluate each response individually. For each response, explain what it does well and what it does poorly.
2. Then, at the very end of your response, provide a final ranking.

IMPORTANT: Keep your evaluation concise - use ONE brief paragraph per response (2-3 sentences each).

IMPORTANT: Your final ranking MUST be formatted EXACTLY as follows:
- Start with the line "{marker}" (all caps, with colon)
- Then list the responses from best to worst as a numbered list
- Each line should be: number, period, space, then ONLY the response label (e.g., "1. Response A")
- Do not add any other text or explanations in the ranking section

Example of the ranking section:

{marker}
{example}

Now provide your evaluation and ranking:"#,
            marker = FINAL_RANKING_MARKER,
            example = example,
        ));

        prompt
    }

    /// User prompt for the synthesizer (Stage 4)
    ///
    /// * `responses` - attribution and Stage 1 text
    /// * `transcript` - rendered Stage 2 transcript, possibly empty
    /// * `aggregate` - display name, average position, vote count; best first
    /// * `evaluations` - evaluator name and de-anonymized evaluation text
    pub fn synthesis_prompt(
        question: &str,
        responses: &[(String, String)],
        transcript: &str,
        aggregate: &[(String, f64, usize)],
        evaluations: &[(String, String)],
    ) -> String {
        let stage1 = responses
            .iter()
            .map(|(who, text)| format!("{}:\n{}", who, text))
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut prompt = format!(
            r#"You are the Chairman of an LLM Council. Multiple AI models with different personalities and roles have provided responses to a user's question, collaborated through discussion, and then ranked each other's responses.

Original Question: {}

STAGE 1 - Initial Responses:
{}
"#,
            question, stage1
        );

        if !transcript.trim().is_empty() {
            prompt.push_str(&format!(
                "\nSTAGE 2 - Collaboration:\n{}\n",
                transcript.trim_end()
            ));
        }

        prompt.push_str("\nSTAGE 3 - Peer Rankings:\n");
        if aggregate.is_empty() {
            prompt.push_str("No usable rankings were produced.\n");
        } else {
            prompt.push_str("Aggregate ranking (lower average position is better):\n");
            for (i, (name, average, votes)) in aggregate.iter().enumerate() {
                prompt.push_str(&format!(
                    "{}. {} (average position {:.2}, {} vote{})\n",
                    i + 1,
                    name,
                    average,
                    votes,
                    if *votes == 1 { "" } else { "s" }
                ));
            }
        }

        for (evaluator, text) in evaluations {
            prompt.push_str(&format!("\n{}'s Evaluation:\n{}\n", evaluator, text));
        }

        prompt.push_str(
            r#"
Your task as Chairman is to synthesize all of this information into a single, comprehensive, accurate answer to the user's original question. Consider:
- The individual responses and their insights
- The collaborative discussion and refinements made
- The peer rankings and what they reveal about response quality
- Any patterns of agreement or disagreement

IMPORTANT: Keep your final answer to 2-3 paragraphs maximum. Be clear, concise, and well-reasoned.

Provide your final answer that represents the council's collective wisdom:"#,
        );

        prompt
    }

    /// User prompt asking for a short conversation title
    pub fn title_prompt(question: &str) -> String {
        format!(
            r#"Generate a very short title (3-5 words maximum) that summarizes the following question.
The title should be concise and descriptive. Do not use quotes or punctuation in the title.

Question: {}

Title:"#,
            question
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Model;
    use crate::deliberation::message::Message;
    use crate::deliberation::response::AgentResponse;

    fn id(s: &str) -> AgentId {
        AgentId::new(s).unwrap()
    }

    fn alice() -> Agent {
        Agent::new(id("alice"), "Alice", "Analyst", Model::default_model())
            .with_personality("analytical")
            .with_traits(vec!["logical".to_string(), "skeptical".to_string()])
    }

    #[test]
    fn test_member_system_has_persona() {
        let prompt = CouncilPromptTemplate::member_system(&alice());
        assert!(prompt.contains("You are Alice"));
        assert!(prompt.contains("Role: Analyst"));
        assert!(prompt.contains("Traits: logical, skeptical"));
    }

    #[test]
    fn test_initial_query_asks_for_brevity() {
        let prompt = CouncilPromptTemplate::initial_query("What is Rust?");
        assert!(prompt.starts_with("What is Rust?"));
        assert!(prompt.contains("ONE paragraph"));
    }

    #[test]
    fn test_collaboration_context_lists_responses() {
        let responses = vec![
            ("Alice (Analyst)".to_string(), "Rust is safe.".to_string()),
            ("Bob (Innovator)".to_string(), "Rust is fun.".to_string()),
        ];
        let prompt = CouncilPromptTemplate::collaboration_context("What is Rust?", &responses);
        assert!(prompt.contains("Original Question: What is Rust?"));
        assert!(prompt.contains("Alice (Analyst):\nRust is safe."));
        assert!(prompt.contains("Bob (Innovator):\nRust is fun."));
    }

    #[test]
    fn test_delivered_messages() {
        let empty = CouncilPromptTemplate::delivered_messages(1, &[]);
        assert!(empty.contains("No messages"));

        let prompt = CouncilPromptTemplate::delivered_messages(
            2,
            &[("Bob".to_string(), "What about async?".to_string())],
        );
        assert!(prompt.contains("after round 2"));
        assert!(prompt.contains("From Bob: What about async?"));
    }

    #[test]
    fn test_transcript_uses_given_names() {
        let rounds = vec![CollaborationRound {
            round_number: 1,
            responses: vec![
                AgentResponse::success(id("alice"), "I agree."),
                AgentResponse::failure(id("bob"), "Timeout"),
            ],
            deliveries: vec![Message {
                from_agent_id: id("alice"),
                to_agent_id: id("bob"),
                round_number: 1,
                text: "Say more".to_string(),
            }],
            rejected: vec![],
        }];

        let named = CouncilPromptTemplate::transcript(&rounds, |id| id.as_str().to_uppercase());
        assert!(named.contains("Round 1:"));
        assert!(named.contains("ALICE: I agree."));
        assert!(named.contains("BOB: [no response]"));
        assert!(named.contains("ALICE -> BOB: Say more"));
    }

    #[test]
    fn test_ranking_prompt_format() {
        let responses = vec![
            ("Response A".to_string(), "Rust is safe.".to_string()),
            ("Response B".to_string(), "Rust is fast.".to_string()),
        ];
        let prompt = CouncilPromptTemplate::ranking_prompt("What is Rust?", &responses, None);
        assert!(prompt.contains("Response A:\nRust is safe."));
        assert!(prompt.contains(FINAL_RANKING_MARKER));
        assert!(prompt.contains("1. Response B\n2. Response A"));
        assert!(!prompt.contains("discussed"));

        let with_transcript = CouncilPromptTemplate::ranking_prompt(
            "What is Rust?",
            &responses,
            Some("Round 1:\nResponse A: I agree.\n"),
        );
        assert!(with_transcript.contains("Response A: I agree."));
    }

    #[test]
    fn test_synthesis_prompt_format() {
        let prompt = CouncilPromptTemplate::synthesis_prompt(
            "What is Rust?",
            &[("Alice (Analyst)".to_string(), "Rust is safe.".to_string())],
            "Round 1:\nAlice: I agree.\n",
            &[("Alice".to_string(), 1.5, 2)],
            &[("Bob".to_string(), "Response A (Alice) is best".to_string())],
        );
        assert!(prompt.contains("STAGE 1 - Initial Responses:\nAlice (Analyst):"));
        assert!(prompt.contains("STAGE 2 - Collaboration:\nRound 1:"));
        assert!(prompt.contains("1. Alice (average position 1.50, 2 votes)"));
        assert!(prompt.contains("Bob's Evaluation:\nResponse A (Alice) is best"));
    }

    #[test]
    fn test_synthesis_prompt_without_transcript_or_rankings() {
        let prompt = CouncilPromptTemplate::synthesis_prompt(
            "What is Rust?",
            &[("Alice (Analyst)".to_string(), "Rust is safe.".to_string())],
            "",
            &[],
            &[],
        );
        assert!(!prompt.contains("STAGE 2"));
        assert!(prompt.contains("No usable rankings"));
    }

    #[test]
    fn test_title_prompt() {
        let prompt = CouncilPromptTemplate::title_prompt("How do lifetimes work?");
        assert!(prompt.contains("Question: How do lifetimes work?"));
        assert!(prompt.ends_with("Title:"));
    }
}
