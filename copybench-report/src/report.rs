//! Report Data Structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Complete benchmark report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub config: ReportConfig,
    /// One entry per series, grouped by buffer size, then program, then file
    pub series: Vec<SeriesReport>,
    pub summary: ReportSummary,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub schema_version: u32,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub system: SystemInfo,
}

/// System information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub cpu: String,
    pub cpu_cores: u32,
    pub memory_gb: f64,
}

/// Run configuration captured in the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub buffers: Vec<usize>,
    pub variants: Vec<String>,
    pub files: Vec<String>,
    pub trials: usize,
    pub tmp_dir: String,
    pub workers: usize,
    pub trial_timeout_ms: Option<u64>,
}

/// One (buffer size, program, file) series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesReport {
    /// Compact id, e.g. `b512/unixcopy/file-1B.bin`
    pub id: String,
    pub buffer_size: usize,
    /// Variant name (`unixcopy`, `unixcopy-stdlib`, `cp`)
    pub variant: String,
    /// Program as invoked
    pub program: String,
    /// Source file as configured
    pub file: String,
    /// Raw per-trial seconds in trial order; `None` marks a failed trial
    pub samples: Vec<Option<f64>>,
    pub failures: Vec<TrialFailure>,
    pub metrics: SeriesMetrics,
}

/// A failed trial and its reason
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialFailure {
    pub trial: usize,
    pub reason: String,
}

/// Trimmed statistics of a series, in seconds
///
/// `None` means undefined: no valid samples, or no exclusion happened for
/// the extremes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesMetrics {
    pub valid: usize,
    pub failed: usize,
    pub excluded_min: Option<f64>,
    pub excluded_max: Option<f64>,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub std_dev: Option<f64>,
    /// `max - mean`
    pub positive_deviation: Option<f64>,
    /// `mean - min`
    pub negative_deviation: Option<f64>,
}

impl SeriesMetrics {
    /// Number of values the mean was computed over
    pub fn remaining(&self) -> usize {
        if self.excluded_min.is_some() {
            self.valid.saturating_sub(2)
        } else {
            self.valid
        }
    }
}

/// Report summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_series: usize,
    pub total_trials: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Series where every trial failed
    pub undefined_series: usize,
    /// Trial artifacts that could not be removed from the temporary directory
    pub cleanup_failures: usize,
    pub total_duration_ms: f64,
}
