//! Console output formatter for council turns

use crate::cli::commands::OutputFormat;
use colored::Colorize;
use council_application::{CouncilTurn, PartialTurn};
use council_domain::{
    ActionRequest, AgentId, AgentRegistry, AgentResponse, CollaborationRound, RankingStage,
    TurnMetadata, TurnWarning,
};
use serde_json::json;

/// Formats council turns for console display
///
/// Agent ids are shown by display name; labels from Stage 3 are shown
/// together with the agent they stood for.
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render a finished turn in the requested format
    pub fn render(turn: &CouncilTurn, registry: &AgentRegistry, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format(turn, registry),
            OutputFormat::Synthesis => Self::format_synthesis_only(turn, registry),
            OutputFormat::Json => Self::format_json(turn),
        }
    }

    /// Format every stage of a finished turn
    pub fn format(turn: &CouncilTurn, registry: &AgentRegistry) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("LLM Council Results"));
        output.push('\n');

        if let Some(title) = &turn.metadata.title {
            output.push_str(&format!("{} {}\n", "Conversation:".cyan().bold(), title));
        }
        output.push_str(&format!(
            "{} {}\n\n",
            "Question:".cyan().bold(),
            turn.question.content()
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Council:".cyan().bold(),
            Self::member_list(registry)
        ));

        output.push_str(&Self::stages_1_to_3(
            &turn.bundle.stage1,
            &turn.bundle.stage2,
            &turn.bundle.stage3,
            &turn.metadata,
            registry,
        ));

        output.push_str(&Self::section_header("Stage 4: Final Synthesis"));
        output.push_str(&format!(
            "\n{}\n\n{}\n",
            format!("Chairman: {}", registry.synthesizer().display_name)
                .yellow()
                .bold(),
            turn.bundle.stage4.text.trim()
        ));

        output.push_str(&Self::format_warnings(&turn.metadata.warnings));
        output.push_str(&Self::footer());

        output
    }

    /// Format the stages that completed before synthesis failed
    pub fn format_partial(partial: &PartialTurn, registry: &AgentRegistry, reason: &str) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("LLM Council Results (incomplete)"));
        output.push('\n');
        output.push_str(&Self::stages_1_to_3(
            &partial.stage1,
            &partial.stage2,
            &partial.stage3,
            &partial.metadata,
            registry,
        ));
        output.push_str(&Self::section_header("Stage 4: Final Synthesis"));
        output.push_str(&format!("\n{} {}\n", "Synthesis failed:".red().bold(), reason));
        output.push_str(&Self::format_warnings(&partial.metadata.warnings));
        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(turn: &CouncilTurn) -> String {
        let value = json!({
            "conversation_id": turn.conversation_id,
            "question": turn.question.content(),
            "stage1": turn.bundle.stage1,
            "stage2": turn.bundle.stage2,
            "stage3": turn.bundle.stage3,
            "stage4": turn.bundle.stage4,
            "metadata": turn.metadata,
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format synthesis only (concise output)
    pub fn format_synthesis_only(turn: &CouncilTurn, registry: &AgentRegistry) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== LLM Council Conclusion ===".cyan().bold()
        ));
        output.push_str(&format!("{} {}\n\n", "Q:".bold(), turn.question.content()));
        output.push_str(&format!(
            "{} {}\n\n",
            "Members consulted:".dimmed(),
            Self::member_list(registry)
        ));
        output.push_str(turn.bundle.stage4.text.trim());
        output.push('\n');

        if !turn.metadata.warnings.is_empty() {
            output.push_str(&format!(
                "\n{}\n",
                format!(
                    "({} member issue(s) during deliberation; use -o full for details)",
                    turn.metadata.warnings.len()
                )
                .dimmed()
            ));
        }

        output
    }

    /// Non-fatal degradations, one per line
    pub fn format_warnings(warnings: &[TurnWarning]) -> String {
        if warnings.is_empty() {
            return String::new();
        }
        let mut output = format!("\n{}\n", "Warnings:".yellow().bold());
        for warning in warnings {
            output.push_str(&format!("  ! {}\n", warning));
        }
        output
    }

    fn stages_1_to_3(
        stage1: &[AgentResponse],
        stage2: &[CollaborationRound],
        stage3: &RankingStage,
        metadata: &TurnMetadata,
        registry: &AgentRegistry,
    ) -> String {
        let name = |id: &AgentId| registry.display_name(id).to_string();
        let mut output = String::new();

        // Stage 1
        output.push_str(&Self::section_header("Stage 1: Individual Responses"));
        for response in stage1 {
            output.push_str(&Self::response_block(response, &name(&response.agent_id)));
        }

        // Stage 2
        if !stage2.is_empty() {
            output.push_str(&Self::section_header("Stage 2: Collaboration"));
            for round in stage2 {
                output.push_str(&format!(
                    "\n{}\n",
                    format!("Round {}", round.round_number).bold()
                ));
                for response in &round.responses {
                    let speaker = name(&response.agent_id);
                    match (response.is_failure, response.remark()) {
                        (true, _) => output.push_str(&format!(
                            "  {} {}\n",
                            format!("{}:", speaker).red(),
                            response.error.as_deref().unwrap_or("no response")
                        )),
                        (false, Some(remark)) => output.push_str(&format!(
                            "  {} {}\n",
                            format!("{}:", speaker).yellow(),
                            remark
                        )),
                        (false, None) => {}
                    }
                }
                for message in &round.deliveries {
                    output.push_str(&format!(
                        "  {} {}\n",
                        format!(
                            "{} -> {}:",
                            name(&message.from_agent_id),
                            name(&message.to_agent_id)
                        )
                        .green(),
                        message.text
                    ));
                }
                for rejected in &round.rejected {
                    let ActionRequest::SendMessage { to_agent_id, .. } = &rejected.request;
                    output.push_str(&format!(
                        "  {}\n",
                        format!(
                            "{} -> {}: dropped ({})",
                            name(&rejected.from_agent_id),
                            to_agent_id,
                            rejected.reason
                        )
                        .dimmed()
                    ));
                }
            }
        }

        // Stage 3
        output.push_str(&Self::section_header("Stage 3: Peer Rankings"));
        let label_name = |label: &str| match metadata.label_to_agent.get(label) {
            Some(id) => format!("{} ({})", label, name(id)),
            None => label.to_string(),
        };
        for ranking in &stage3.rankings {
            let evaluator = name(&ranking.evaluator_agent_id);
            if ranking.is_valid {
                let order = ranking
                    .parsed_order
                    .iter()
                    .map(|l| label_name(l.as_str()))
                    .collect::<Vec<_>>()
                    .join(" > ");
                output.push_str(&format!("  {} {}\n", format!("{}:", evaluator).yellow(), order));
            } else {
                let why = ranking.error.as_deref().unwrap_or("no ranking found");
                output.push_str(&format!(
                    "  {} {}\n",
                    format!("{}:", evaluator).red(),
                    why.dimmed()
                ));
            }
        }

        if stage3.aggregate.is_empty() {
            output.push_str(&format!("\n{}\n", "No valid rankings.".dimmed()));
        } else {
            output.push_str(&format!("\n{}\n", "Aggregate ranking:".cyan().bold()));
            for (i, entry) in stage3.aggregate.iter().enumerate() {
                output.push_str(&format!(
                    "  {}. {:<16} avg {:.2} ({} vote{})\n",
                    i + 1,
                    name(&entry.agent_id),
                    entry.average_position,
                    entry.vote_count,
                    if entry.vote_count == 1 { "" } else { "s" }
                ));
            }
        }

        output
    }

    fn response_block(response: &AgentResponse, name: &str) -> String {
        if response.is_failure {
            format!(
                "\n{}\nError: {}\n",
                format!("── {} ──", name).red().bold(),
                response.error.as_deref().unwrap_or("Unknown")
            )
        } else {
            format!(
                "\n{}\n{}\n",
                format!("── {} ──", name).yellow().bold(),
                response.text.trim()
            )
        }
    }

    fn member_list(registry: &AgentRegistry) -> String {
        registry
            .members()
            .iter()
            .map(|a| format!("{} [{}]", a.display_name, a.model))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
