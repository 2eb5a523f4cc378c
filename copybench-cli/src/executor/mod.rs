//! Run Executor
//!
//! Executes a validated plan and turns the collected samples into a report.
//!
//! ## Pipeline Overview
//!
//! ```text
//! ExecutionPlan (validated work items)
//!       │
//!       ▼
//! ┌─────────────┐
//! │  execution  │  Dispatch trials on the worker pool, fill the table
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ statistics  │  Trimmed summary per series (parallel)
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   report    │  Build the serializable Report
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Human-readable output
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - Worker pool dispatch and result collection
//! - [`statistics`] - Parallel statistics computation
//! - [`report`] - Report building
//! - [`formatting`] - Human-readable output formatting
//! - [`metadata`] - System metadata collection

mod execution;
mod formatting;
mod metadata;
mod report;
mod statistics;

pub use execution::{ExecutionConfig, Executor, RunOutcome};
pub use formatting::format_human_output;
pub use report::build_report;
pub use statistics::compute_statistics;
