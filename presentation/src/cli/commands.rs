//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for council results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every stage: answers, collaboration, rankings, synthesis
    Full,
    /// Only the final synthesis
    Synthesis,
    /// JSON output
    Json,
}

impl From<council_domain::OutputFormat> for OutputFormat {
    fn from(format: council_domain::OutputFormat) -> Self {
        match format {
            council_domain::OutputFormat::Full => OutputFormat::Full,
            council_domain::OutputFormat::Synthesis => OutputFormat::Synthesis,
            council_domain::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for llm-council
#[derive(Parser, Debug)]
#[command(name = "llm-council")]
#[command(author, version, about = "LLM Council - a panel of models deliberates and synthesizes one answer")]
#[command(long_about = r#"
LLM Council runs a fixed panel of model agents through a four-stage deliberation.

1. Responses: every member answers your question independently
2. Collaboration: members exchange messages over a few bounded rounds
3. Ranking: members rank each other's anonymized answers
4. Synthesis: the chairman writes the final answer from everything above

Configuration files are loaded from (in priority order):
1. COUNCIL_* environment variables (e.g. COUNCIL_DELIBERATION__ROUNDS=3)
2. --config <path>     Explicit config file
3. ./council.toml      Project-level config
4. ~/.config/llm-council/config.toml   Global config

Example:
  llm-council "What's the best way to handle errors in Rust?"
  llm-council --rounds 0 -o full "Compare async runtimes"
  llm-council --chat
"#)]
pub struct Cli {
    /// The question to ask the council (not required in chat mode)
    pub question: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Continue an existing conversation (chat mode)
    #[arg(long, value_name = "ID", requires = "chat")]
    pub conversation: Option<String>,

    /// Output format (defaults to the config file setting, then synthesis)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Number of collaboration rounds (0 skips Stage 2)
    #[arg(short, long, value_name = "N")]
    pub rounds: Option<usize>,

    /// Per-agent timeout in seconds for Stages 1-3
    #[arg(short, long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Do not persist the conversation
    #[arg(long)]
    pub no_store: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
