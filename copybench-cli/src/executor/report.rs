//! Report Building
//!
//! Assembles the serializable report from a completed run.
//!
//! ```text
//! CompletedTable + SeriesSummary
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │   SeriesReport ×N   │  raw samples, failures, trimmed metrics
//!   └──────────┬──────────┘
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │       Report        │  Ready for human/JSON/CSV output
//!   └─────────────────────┘
//! ```
//!
//! NaN never crosses this boundary: undefined statistics and failed trials
//! become `None`.

use super::execution::{ExecutionConfig, RunOutcome};
use super::metadata::build_report_meta;
use crate::planner::ExecutionPlan;
use copybench_core::{Series, SeriesKey};
use copybench_report::{
    Report, ReportConfig, ReportSummary, SeriesMetrics, SeriesReport, TrialFailure,
};
use copybench_stats::SeriesSummary;
use rayon::prelude::*;
use std::collections::HashMap;

/// Build the complete report of a run
///
/// `stats` must hold one summary per series of `outcome.table`; a series
/// without one is reported with undefined metrics.
pub fn build_report(
    plan: &ExecutionPlan,
    config: &ExecutionConfig,
    outcome: &RunOutcome,
    stats: &[(SeriesKey, SeriesSummary)],
) -> Report {
    let stats_map: HashMap<&SeriesKey, &SeriesSummary> =
        stats.iter().map(|(key, summary)| (key, summary)).collect();

    let series: Vec<SeriesReport> = outcome
        .table
        .series()
        .par_iter()
        .map(|s| series_report(plan, s, stats_map.get(&s.key).copied()))
        .collect();

    let total_trials = outcome.table.total_samples();
    let failed = outcome.table.failed_samples();
    let summary = ReportSummary {
        total_series: series.len(),
        total_trials,
        succeeded: total_trials - failed,
        failed,
        undefined_series: series.iter().filter(|s| s.metrics.mean.is_none()).count(),
        cleanup_failures: outcome.cleanup_failures,
        total_duration_ms: outcome.duration.as_secs_f64() * 1000.0,
    };

    Report {
        meta: build_report_meta(),
        config: ReportConfig {
            buffers: plan.matrix.buffers().to_vec(),
            variants: plan
                .matrix
                .variants()
                .iter()
                .map(|v| v.name().to_string())
                .collect(),
            files: plan
                .matrix
                .sources()
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            trials: plan.trials(),
            tmp_dir: plan.matrix.tmp_dir().display().to_string(),
            workers: outcome.workers,
            trial_timeout_ms: config.trial_timeout.map(|t| t.as_millis() as u64),
        },
        series,
        summary,
    }
}

fn series_report(
    plan: &ExecutionPlan,
    series: &Series,
    summary: Option<&SeriesSummary>,
) -> SeriesReport {
    let key = &series.key;
    let failures = series
        .samples
        .iter()
        .enumerate()
        .filter_map(|(trial, sample)| {
            sample.failure().map(|reason| TrialFailure {
                trial,
                reason: reason.to_string(),
            })
        })
        .collect();

    SeriesReport {
        id: key.id(),
        buffer_size: key.buffer_size,
        variant: key.variant.name().to_string(),
        program: plan.programs.program(key.variant).to_string(),
        file: key.source.display().to_string(),
        samples: series.samples.iter().map(|s| s.seconds()).collect(),
        failures,
        metrics: summary.map(metrics).unwrap_or_else(|| SeriesMetrics {
            failed: series.failed(),
            ..Default::default()
        }),
    }
}

fn metrics(s: &SeriesSummary) -> SeriesMetrics {
    SeriesMetrics {
        valid: s.valid_count,
        failed: s.failed_count,
        excluded_min: s.excluded_min,
        excluded_max: s.excluded_max,
        mean: defined(s.mean),
        min: defined(s.min),
        max: defined(s.max),
        std_dev: defined(s.std_dev),
        positive_deviation: defined(s.positive_deviation),
        negative_deviation: defined(s.negative_deviation),
    }
}

fn defined(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
