//! Progress notification port
//!
//! Defines the interface for reporting progress during a council turn.

use council_domain::{Agent, Stage, TurnWarning};

/// Callback for progress updates during a council turn
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain log lines, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a stage starts
    fn on_stage_start(&self, stage: &Stage, total_tasks: usize);

    /// Called when one agent's query within a stage resolves
    fn on_task_complete(&self, stage: &Stage, agent: &Agent, success: bool);

    /// Called when a stage completes
    fn on_stage_complete(&self, stage: &Stage);

    /// Called when a collaboration round starts (1-based)
    fn on_round_start(&self, _round: usize, _total_rounds: usize) {}

    /// Called for every non-fatal degradation
    fn on_warning(&self, _warning: &TurnWarning) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_stage_start(&self, _stage: &Stage, _total_tasks: usize) {}
    fn on_task_complete(&self, _stage: &Stage, _agent: &Agent, _success: bool) {}
    fn on_stage_complete(&self, _stage: &Stage) {}
}
