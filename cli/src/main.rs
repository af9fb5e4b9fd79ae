//! CLI entrypoint for LLM Council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use council_application::{
    ConversationStore, NoConversationStore, RunCouncilError, RunCouncilInput, RunCouncilUseCase,
};
use council_infrastructure::{ConfigLoader, FileConfig, JsonlConversationStore, OpenAiGateway};
use council_presentation::{
    ChatRepl, Cli, ConsoleFormatter, OutputFormat, ProgressReporter, SimpleProgress,
};
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let _log_guard = init_logging(&cli)?;

    // === Configuration ===
    let config: FileConfig = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?
    };

    let issues = config.validate();
    for issue in issues.iter().filter(|i| !i.is_error()) {
        warn!("config: {}", issue.message);
    }
    let errors: Vec<_> = issues.iter().filter(|i| i.is_error()).collect();
    if !errors.is_empty() {
        for issue in &errors {
            eprintln!("config error: {}", issue.message);
        }
        bail!("Invalid configuration ({} error(s))", errors.len());
    }

    if !config.output.color {
        colored::control::set_override(false);
    }

    let mut params = config.to_params()?;
    if let Some(rounds) = cli.rounds {
        params = params.with_rounds(rounds);
    }
    if let Some(secs) = cli.timeout {
        params = params.with_agent_timeout(Duration::from_secs(secs));
    }
    let registry = Arc::new(config.to_registry()?);

    let format = cli
        .output
        .or_else(|| config.output.format.map(OutputFormat::from))
        .unwrap_or(OutputFormat::Synthesis);

    // === Dependency Injection ===
    let gateway = Arc::new(OpenAiGateway::from_config(&config.gateway)?);
    info!("Using model endpoint {}", gateway.url());

    let store: Arc<dyn ConversationStore> = if config.storage.enabled && !cli.no_store {
        let dir = config.storage.data_dir();
        info!("Persisting conversations to {}", dir.display());
        Arc::new(JsonlConversationStore::new(dir))
    } else {
        Arc::new(NoConversationStore)
    };

    let use_case =
        RunCouncilUseCase::new(gateway, Arc::clone(&registry), params).with_store(Arc::clone(&store));

    // Chat mode
    if cli.chat {
        let mut repl = ChatRepl::new(use_case)
            .with_progress(!cli.quiet && config.repl.show_progress)
            .with_format(format)
            .with_store(store);
        if let Some(path) = config.repl.history_path() {
            repl = repl.with_history_file(path);
        }
        if let Some(id) = &cli.conversation {
            repl = repl.with_conversation(id.clone());
        }

        repl.run().await?;
        return Ok(());
    }

    // Single question mode - question is required
    let question = match cli.question {
        Some(q) => q,
        None => bail!("Question is required. Use --chat for interactive mode."),
    };

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let input = RunCouncilInput::new(question).with_cancellation(cancel);

    let result = if cli.quiet {
        use_case.execute(input).await
    } else if std::io::stderr().is_terminal() {
        let progress = ProgressReporter::new();
        use_case.execute_with_progress(input, &progress).await
    } else {
        use_case.execute_with_progress(input, &SimpleProgress).await
    };

    match result {
        Ok(turn) => {
            println!("{}", ConsoleFormatter::render(&turn, &registry, format));
            Ok(())
        }
        Err(RunCouncilError::SynthesizerFailure { reason, partial }) => {
            println!(
                "{}",
                ConsoleFormatter::format_partial(&partial, &registry, &reason)
            );
            bail!("Synthesis failed: {}", reason)
        }
        Err(RunCouncilError::AllAgentsFailed { stage1 }) => {
            for response in &stage1 {
                if let Some(error) = &response.error {
                    eprintln!("  {}: {}", registry.display_name(&response.agent_id), error);
                }
            }
            Err(RunCouncilError::AllAgentsFailed { stage1 }.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Set up tracing from `-v`/`-q`, with `RUST_LOG` taking precedence
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = match (cli.quiet, cli.verbose) {
        (true, 0) => "error",
        (_, 0) => "warn",
        (_, 1) => "info",
        (_, 2) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match &cli.log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("Invalid log file path: {}", path.display()))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}
