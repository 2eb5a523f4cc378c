//! Series Summary
//!
//! Reduces one series of trial samples to a trimmed summary:
//! - Failures are counted but excluded from every statistic
//! - Mean, min, max and deviations come from the TRIMMED values
//! - The excluded extremes are kept for transparency
//!
//! With no valid values every derived statistic is NaN, never zero.

use crate::outliers::{TrimAnalysis, trim_extremes};
use crate::sample::Sample;

/// Trimmed summary of one series
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    // Sample info
    pub sample_count: usize,
    pub valid_count: usize,
    pub failed_count: usize,

    // Excluded extremes (None when fewer than three valid values)
    pub excluded_min: Option<f64>,
    pub excluded_max: Option<f64>,

    // Computed from the remaining values
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,

    /// `max - mean`
    pub positive_deviation: f64,
    /// `mean - min`
    pub negative_deviation: f64,
}

impl SeriesSummary {
    fn undefined(sample_count: usize, failed_count: usize) -> Self {
        Self {
            sample_count,
            valid_count: 0,
            failed_count,
            excluded_min: None,
            excluded_max: None,
            mean: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            std_dev: f64::NAN,
            positive_deviation: f64::NAN,
            negative_deviation: f64::NAN,
        }
    }

    /// Whether any valid value contributed (statistics are not NaN)
    pub fn is_defined(&self) -> bool {
        self.valid_count > 0
    }

    /// Number of values the mean was computed over
    pub fn remaining_count(&self) -> usize {
        if self.excluded_min.is_some() {
            self.valid_count - 2
        } else {
            self.valid_count
        }
    }
}

/// Compute the trimmed summary of a series
///
/// Pure function of the multiset of samples: order does not matter and
/// repeated calls give identical results.
pub fn compute_summary(samples: &[Sample]) -> SeriesSummary {
    let valid: Vec<f64> = samples.iter().filter_map(Sample::seconds).collect();
    let failed_count = samples.len() - valid.len();

    if valid.is_empty() {
        return SeriesSummary::undefined(samples.len(), failed_count);
    }

    let TrimAnalysis {
        remaining,
        excluded_min,
        excluded_max,
        ..
    } = trim_extremes(&valid);

    // remaining is sorted and non-empty: trimming leaves at least one value
    let min = remaining[0];
    let max = remaining[remaining.len() - 1];
    let mean = remaining.iter().sum::<f64>() / remaining.len() as f64;

    // Population deviation over the remaining values
    let variance =
        remaining.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / remaining.len() as f64;

    SeriesSummary {
        sample_count: samples.len(),
        valid_count: valid.len(),
        failed_count,
        excluded_min,
        excluded_max,
        mean,
        min,
        max,
        std_dev: variance.sqrt(),
        positive_deviation: max - mean,
        negative_deviation: mean - min,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::FailureKind;
    use rand::seq::SliceRandom;
    use rand::thread_rng;

    fn elapsed(values: &[f64]) -> Vec<Sample> {
        values.iter().map(|&v| Sample::Elapsed(v)).collect()
    }

    fn failed() -> Sample {
        Sample::Failed(FailureKind::ExitStatus(Some(1)))
    }

    #[test]
    fn test_trimmed_summary() {
        let summary = compute_summary(&elapsed(&[5.0, 1.0, 2.0, 3.0, 100.0]));

        assert_eq!(summary.excluded_min, Some(1.0));
        assert_eq!(summary.excluded_max, Some(100.0));
        assert!((summary.mean - 10.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 5.0);
        assert!((summary.positive_deviation - (5.0 - 10.0 / 3.0)).abs() < 1e-9);
        assert!((summary.negative_deviation - (10.0 / 3.0 - 2.0)).abs() < 1e-9);
        assert_eq!(summary.remaining_count(), 3);
    }

    #[test]
    fn test_small_series_no_exclusion() {
        let summary = compute_summary(&elapsed(&[5.0, 1.0]));

        assert_eq!(summary.excluded_min, None);
        assert_eq!(summary.excluded_max, None);
        assert!((summary.mean - 3.0).abs() < f64::EPSILON);
        assert!((summary.positive_deviation - 2.0).abs() < f64::EPSILON);
        assert!((summary.negative_deviation - 2.0).abs() < f64::EPSILON);
        assert_eq!(summary.remaining_count(), 2);
    }

    #[test]
    fn test_single_value() {
        let summary = compute_summary(&elapsed(&[0.25]));

        assert!((summary.mean - 0.25).abs() < f64::EPSILON);
        assert_eq!(summary.positive_deviation, 0.0);
        assert_eq!(summary.negative_deviation, 0.0);
        assert_eq!(summary.std_dev, 0.0);
    }

    #[test]
    fn test_all_failed_is_undefined() {
        let summary = compute_summary(&[failed(), failed(), failed()]);

        assert!(!summary.is_defined());
        assert_eq!(summary.sample_count, 3);
        assert_eq!(summary.failed_count, 3);
        assert!(summary.mean.is_nan());
        assert!(summary.positive_deviation.is_nan());
        assert!(summary.negative_deviation.is_nan());
        assert!(summary.excluded_min.is_none());
    }

    #[test]
    fn test_nan_measurements_are_undefined() {
        let summary = compute_summary(&elapsed(&[f64::NAN, f64::NAN, f64::NAN]));

        assert!(!summary.is_defined());
        assert!(summary.mean.is_nan());
    }

    #[test]
    fn test_failures_excluded_before_trimming() {
        // Two valid values left after dropping failures: no trimming
        let samples = vec![failed(), Sample::Elapsed(1.0), failed(), Sample::Elapsed(3.0)];
        let summary = compute_summary(&samples);

        assert_eq!(summary.valid_count, 2);
        assert_eq!(summary.failed_count, 2);
        assert_eq!(summary.excluded_min, None);
        assert!((summary.mean - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_failures_never_count_as_zero() {
        let samples = vec![
            failed(),
            Sample::Elapsed(2.0),
            Sample::Elapsed(2.0),
            Sample::Elapsed(2.0),
            failed(),
        ];
        let summary = compute_summary(&samples);

        assert_eq!(summary.excluded_min, Some(2.0));
        assert!((summary.mean - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_idempotent_and_order_independent() {
        let mut samples = elapsed(&[0.9, 0.2, 0.4, 0.35, 0.5, 0.41, 7.0]);
        samples.push(failed());
        let first = compute_summary(&samples);

        assert_eq!(compute_summary(&samples), first);

        let mut rng = thread_rng();
        for _ in 0..10 {
            samples.shuffle(&mut rng);
            let again = compute_summary(&samples);
            assert_eq!(again.excluded_min, first.excluded_min);
            assert_eq!(again.excluded_max, first.excluded_max);
            assert!((again.mean - first.mean).abs() < 1e-12);
            assert!((again.positive_deviation - first.positive_deviation).abs() < 1e-12);
        }
    }

    #[test]
    fn test_empty_series() {
        let summary = compute_summary(&[]);

        assert_eq!(summary.sample_count, 0);
        assert!(summary.mean.is_nan());
    }
}
