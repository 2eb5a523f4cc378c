//! Extreme-Value Trimming
//!
//! Drops exactly one minimum and one maximum from a series once at least
//! three valid values exist. Below three values nothing is excluded.
//!
//! **Fixed policy**: no trimming fraction, no alternative estimators.

/// Minimum number of valid values before extremes are excluded
pub const TRIM_THRESHOLD: usize = 3;

/// Result of extreme-value trimming
#[derive(Debug, Clone, PartialEq)]
pub struct TrimAnalysis {
    /// Values left after exclusion, ascending
    pub remaining: Vec<f64>,
    /// Excluded minimum, `None` when no trimming happened
    pub excluded_min: Option<f64>,
    /// Excluded maximum, `None` when no trimming happened
    pub excluded_max: Option<f64>,
}

impl TrimAnalysis {
    /// Whether any values were excluded
    pub fn is_trimmed(&self) -> bool {
        self.excluded_min.is_some()
    }
}

/// Exclude one global minimum and one global maximum from `values`
///
/// Non-finite values are dropped before sorting. Input order is irrelevant.
///
/// # Examples
///
/// ```
/// # use copybench_stats::trim_extremes;
/// let analysis = trim_extremes(&[5.0, 1.0, 2.0, 3.0, 100.0]);
/// assert_eq!(analysis.excluded_min, Some(1.0));
/// assert_eq!(analysis.excluded_max, Some(100.0));
/// assert_eq!(analysis.remaining, vec![2.0, 3.0, 5.0]);
/// ```
pub fn trim_extremes(values: &[f64]) -> TrimAnalysis {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);

    if sorted.len() < TRIM_THRESHOLD {
        return TrimAnalysis {
            remaining: sorted,
            excluded_min: None,
            excluded_max: None,
        };
    }

    let last = sorted.len() - 1;
    TrimAnalysis {
        remaining: sorted[1..last].to_vec(),
        excluded_min: Some(sorted[0]),
        excluded_max: Some(sorted[last]),
    }
}
