//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::cli::commands::OutputFormat;
use crate::{ConsoleFormatter, ProgressReporter};
use colored::Colorize;
use council_application::{
    ConversationStore, ModelGateway, NoProgress, ProgressNotifier, RunCouncilError,
    RunCouncilInput, RunCouncilUseCase,
};
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const HISTORY_CAPACITY: usize = 1000;

/// Slash commands understood by the REPL
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Help,
    Members,
    History,
    New,
    Quit,
    Unknown(String),
}

impl ReplCommand {
    fn parse(line: &str) -> Option<Self> {
        let cmd = line.strip_prefix('/')?.split_whitespace().next().unwrap_or("");
        Some(match cmd {
            "help" | "h" | "?" => ReplCommand::Help,
            "members" | "council" => ReplCommand::Members,
            "history" => ReplCommand::History,
            "new" | "reset" => ReplCommand::New,
            "quit" | "exit" | "q" => ReplCommand::Quit,
            other => ReplCommand::Unknown(other.to_string()),
        })
    }
}

/// Interactive chat REPL
///
/// Every question is a full council turn. Turns share one conversation id
/// until `/new`; the first turn of a conversation also gets a title.
pub struct ChatRepl<G: ModelGateway + 'static> {
    use_case: RunCouncilUseCase<G>,
    store: Option<Arc<dyn ConversationStore>>,
    conversation_id: Option<String>,
    show_progress: bool,
    format: OutputFormat,
    history_path: Option<PathBuf>,
}

impl<G: ModelGateway + 'static> ChatRepl<G> {
    /// Create a new ChatRepl
    pub fn new(use_case: RunCouncilUseCase<G>) -> Self {
        Self {
            use_case,
            store: None,
            conversation_id: None,
            show_progress: true,
            format: OutputFormat::Synthesis,
            history_path: None,
        }
    }

    /// Set whether to show progress
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Store used by `/history`; should be the one the use case writes to
    pub fn with_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Continue an existing conversation instead of starting a new one
    pub fn with_conversation(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    pub fn with_history_file(mut self, path: PathBuf) -> Self {
        self.history_path = Some(path);
        self
    }

    fn line_editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = &self.history_path else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                eprintln!("{} history disabled: {}", "Warning:".yellow(), e);
                editor
            }
        }
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut editor = self.line_editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("council".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if let Some(command) = ReplCommand::parse(line) {
                        if self.handle_command(command) {
                            break;
                        }
                        continue;
                    }

                    self.process_question(line).await;
                }
                Signal::CtrlC => {
                    println!("^C");
                    continue;
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│           LLM Council - Chat Mode           │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        self.print_members();
        if let Some(id) = &self.conversation_id {
            println!("Continuing conversation {}", id.cyan());
        }
        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?     - Show this help");
        println!("  /members          - Show council members");
        println!("  /history          - Show questions asked in this conversation");
        println!("  /new              - Start a new conversation");
        println!("  /quit, /exit, /q  - Exit chat");
        println!();
    }

    fn print_members(&self) {
        let registry = self.use_case.registry();
        println!("Council:");
        for agent in registry.members() {
            println!("  - {} [{}]", agent.attribution(), agent.model);
        }
        let chairman = registry.synthesizer();
        println!("Chairman: {} [{}]", chairman.display_name, chairman.model);
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => {
                println!();
                Self::print_help();
            }
            ReplCommand::Members => {
                println!();
                self.print_members();
                println!();
            }
            ReplCommand::History => self.print_history(),
            ReplCommand::New => {
                self.conversation_id = None;
                println!("Started a new conversation.");
            }
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: /{}", cmd);
                println!("Type /help for available commands");
            }
        }
        false
    }

    fn print_history(&self) {
        let (Some(store), Some(id)) = (&self.store, &self.conversation_id) else {
            println!("No stored turns in this conversation.");
            return;
        };
        match store.load(id) {
            Ok(records) if records.is_empty() => println!("No stored turns in this conversation."),
            Ok(records) => {
                if let Some(title) = records.iter().find_map(|r| r.title.as_deref()) {
                    println!("{}", title.bold());
                }
                for (i, record) in records.iter().enumerate() {
                    println!(
                        "  {}. [{}] {}",
                        i + 1,
                        record.timestamp.format("%Y-%m-%d %H:%M"),
                        record.question
                    );
                }
            }
            Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
        }
    }

    async fn process_question(&mut self, question: &str) {
        println!();

        let cancel = CancellationToken::new();
        let interrupt = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            }
        });

        let mut input = RunCouncilInput::new(question).with_cancellation(cancel);
        match &self.conversation_id {
            Some(id) => input = input.with_conversation_id(id.clone()),
            None => input = input.with_title(),
        }

        let reporter = ProgressReporter::new();
        let progress: &dyn ProgressNotifier = if self.show_progress {
            &reporter
        } else {
            &NoProgress
        };
        let result = self.use_case.execute_with_progress(input, progress).await;
        interrupt.abort();

        let registry = self.use_case.registry();
        match result {
            Ok(turn) => {
                if self.conversation_id.is_none() {
                    self.conversation_id = Some(turn.conversation_id.clone());
                }
                println!();
                println!("{}", ConsoleFormatter::render(&turn, registry, self.format));
            }
            Err(RunCouncilError::SynthesizerFailure { reason, partial }) => {
                println!(
                    "{}",
                    ConsoleFormatter::format_partial(&partial, registry, &reason)
                );
            }
            Err(RunCouncilError::Cancelled) => {
                println!("{}", "Turn cancelled.".yellow());
            }
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
            }
        }
        println!();
    }
}
