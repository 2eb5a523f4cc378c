#![warn(missing_docs)]
//! # CopyBench
//!
//! Concurrent wall-clock benchmarking of external file copy programs.
//!
//! CopyBench measures how long a set of copy programs take to duplicate a set
//! of source files, for each buffer size of interest:
//! - **Full Matrix**: buffer sizes × program variants × source files × N trials
//! - **Bounded Concurrency**: trials run on a fixed-size worker pool, each one a
//!   child process timed from just before launch to observed exit
//! - **Failure Isolation**: a failed trial is recorded as such and never
//!   disturbs its siblings
//! - **Trimmed Statistics**: one minimum and one maximum are dropped from each
//!   series with at least three valid runs before the mean and deviations
//!   are computed
//! - **Reports**: human-readable, JSON and CSV output
//!
//! ## Quick Start
//!
//! ```text
//! $ copybench -b 512,4096 -n 10 -f big.bin --variant unixcopy --variant cp
//! $ copybench list "^b512/"
//! ```
//!
//! ## Library Use
//!
//! ```ignore
//! use copybench::prelude::*;
//!
//! let matrix = Matrix::new([512], [Variant::SystemCopy], ["a.bin"], 5, "/tmp");
//! let plan = build_plan(matrix, ProgramSet::default(), None)?;
//! let outcome = Executor::new(ExecutionConfig::default()).execute(&plan)?;
//! for (key, summary) in compute_statistics(&outcome.table) {
//!     println!("{}: {:.6} s", key, summary.mean);
//! }
//! ```

// Re-export core types
pub use copybench_core::{
    CompletedTable, Coordinate, FailureKind, Matrix, ProcessRunner, ProgramSet, RecordError,
    ResultTable, Sample, Series, SeriesKey, Timer, TrialRunner, Variant, WorkItem,
};

// Re-export stats
pub use copybench_stats::{SeriesSummary, TrimAnalysis, compute_summary, trim_extremes};

// Re-export report types
pub use copybench_report::{OutputFormat, Report, SeriesMetrics, SeriesReport};

// Re-export the driver
pub use copybench_cli::{
    CopyBenchConfig, DispatchError, Dispatcher, ExecutionConfig, ExecutionPlan, Executor,
    PlanError, RunOutcome, build_plan, build_report, compute_statistics, format_human_output,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        ExecutionConfig, Executor, Matrix, ProgramSet, Sample, SeriesKey, TrialRunner, Variant,
        WorkItem, build_plan, compute_statistics,
    };
}

/// Run the CopyBench CLI.
///
/// Call this from a binary's `main()`:
/// ```ignore
/// fn main() {
///     copybench::run().unwrap();
/// }
/// ```
pub use copybench_cli::run;
