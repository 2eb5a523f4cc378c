#![warn(missing_docs)]
//! CopyBench Statistical Engine
//!
//! Reduces small, noisy series of trial timings to descriptive statistics:
//! - Tagged samples: measurements and failure markers in one series
//! - Fixed extreme-value trimming (one min, one max, from three values up)
//! - Trimmed mean with explicit positive/negative deviation bounds
//!
//! Failures are carried through every series so trial counts stay exact,
//! but never enter a computation.

mod outliers;
mod sample;
mod summary;

pub use outliers::{TRIM_THRESHOLD, TrimAnalysis, trim_extremes};
pub use sample::{FailureKind, Sample};
pub use summary::{SeriesSummary, compute_summary};
