//! Progress reporting for council turns

use colored::Colorize;
use council_application::ProgressNotifier;
use council_domain::{Agent, Stage, TurnWarning};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress during a council turn with progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    stage_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            stage_bar: Mutex::new(None),
        }
    }

    fn stage_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let guard = self.stage_bar.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pb) = guard.as_ref() {
            f(pb);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_stage_start(&self, stage: &Stage, total_tasks: usize) {
        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::stage_style());
        pb.set_prefix(stage.to_string());
        pb.set_message("Starting...");

        *self.stage_bar.lock().unwrap_or_else(|e| e.into_inner()) = Some(pb);
    }

    fn on_task_complete(&self, _stage: &Stage, agent: &Agent, success: bool) {
        self.with_bar(|pb| {
            let status = if success {
                format!("{} {}", "v".green(), agent.display_name)
            } else {
                format!("{} {}", "x".red(), agent.display_name)
            };
            pb.set_message(status);
            pb.inc(1);
        });
    }

    fn on_stage_complete(&self, stage: &Stage) {
        let taken = self
            .stage_bar
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(pb) = taken {
            pb.finish_with_message(format!("{} complete!", stage.display_name().green()));
        }
    }

    fn on_round_start(&self, round: usize, total_rounds: usize) {
        self.with_bar(|pb| pb.set_message(format!("round {}/{}", round, total_rounds)));
    }

    fn on_warning(&self, warning: &TurnWarning) {
        let line = format!("  {} {}", "!".yellow(), warning);
        if self.multi.println(&line).is_err() {
            eprintln!("{}", line);
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_stage_start(&self, stage: &Stage, total_tasks: usize) {
        eprintln!(
            "{} {} ({} tasks)",
            "->".cyan(),
            stage.to_string().bold(),
            total_tasks
        );
    }

    fn on_task_complete(&self, _stage: &Stage, agent: &Agent, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), agent.display_name);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), agent.display_name);
        }
    }

    fn on_stage_complete(&self, _stage: &Stage) {
        eprintln!();
    }

    fn on_round_start(&self, round: usize, total_rounds: usize) {
        eprintln!("  {} round {}/{}", "~".cyan(), round, total_rounds);
    }

    fn on_warning(&self, warning: &TurnWarning) {
        eprintln!("  {} {}", "!".yellow(), warning);
    }
}
