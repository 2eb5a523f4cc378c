//! Statistics Computation
//!
//! Reduces every series of a completed run to its trimmed summary. Series are
//! independent, so they are reduced in parallel with Rayon.

use copybench_core::{CompletedTable, SeriesKey};
use copybench_stats::{SeriesSummary, compute_summary};
use rayon::prelude::*;

/// Compute the summary of each series, in table order
pub fn compute_statistics(table: &CompletedTable) -> Vec<(SeriesKey, SeriesSummary)> {
    table
        .series()
        .par_iter()
        .map(|series| (series.key.clone(), compute_summary(&series.samples)))
        .collect()
}
