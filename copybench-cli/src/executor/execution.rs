//! Run Execution
//!
//! Drives one benchmark run: builds the result table for the planned series,
//! dispatches every work item through the worker pool with a progress bar,
//! and freezes the table once all trials have reported.

use crate::dispatcher::{DispatchError, Dispatcher, default_workers};
use crate::planner::ExecutionPlan;
use copybench_core::{CompletedTable, ProcessRunner, ResultTable, TrialRunner};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};
use tracing::info;

/// Execution settings for a run
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Worker threads; clamped by the dispatcher
    pub workers: usize,
    /// Kill a trial after this long; `None` waits indefinitely
    pub trial_timeout: Option<Duration>,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            trial_timeout: None,
            show_progress: true,
        }
    }
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// One sample per planned trial
    pub table: CompletedTable,
    /// Worker threads actually used
    pub workers: usize,
    /// Destination files that could not be removed
    pub cleanup_failures: usize,
    /// Wall-clock duration of the whole run
    pub duration: Duration,
}

/// Executes a plan on a dedicated worker pool
pub struct Executor {
    config: ExecutionConfig,
}

impl Executor {
    pub fn new(config: ExecutionConfig) -> Self {
        Self { config }
    }

    /// Run every trial of the plan as a child process
    pub fn execute(&self, plan: &ExecutionPlan) -> Result<RunOutcome, DispatchError> {
        let runner = ProcessRunner::with_timeout(self.config.trial_timeout);
        let mut outcome = self.execute_with(plan, &runner)?;
        outcome.cleanup_failures = runner.cleanup_failures();
        Ok(outcome)
    }

    /// Run every trial of the plan through a custom runner
    ///
    /// The returned outcome reports no cleanup failures; runners that own
    /// artifacts track their own.
    pub fn execute_with<R>(
        &self,
        plan: &ExecutionPlan,
        runner: &R,
    ) -> Result<RunOutcome, DispatchError>
    where
        R: TrialRunner + ?Sized,
    {
        let start = Instant::now();
        let dispatcher = Dispatcher::new(self.config.workers)?;
        let table = ResultTable::new(plan.series.iter().cloned(), plan.trials());

        info!(
            "Running {} trials across {} series with {} worker(s)",
            plan.total_trials(),
            plan.series.len(),
            dispatcher.workers()
        );

        let pb = self.progress_bar(plan.total_trials());
        let dispatched = dispatcher.run(&plan.items, runner, &table, &pb);
        pb.finish_with_message("Complete");
        dispatched?;

        let table = table.finish()?;
        let duration = start.elapsed();
        info!(
            "Completed {} trials ({} failed) in {:.2}s",
            table.total_samples(),
            table.failed_samples(),
            duration.as_secs_f64()
        );

        Ok(RunOutcome {
            table,
            workers: dispatcher.workers(),
            cleanup_failures: 0,
            duration,
        })
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message("trials");
        pb
    }
}
