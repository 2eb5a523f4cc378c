//! Trial Samples
//!
//! One `Sample` is produced per executed trial: either an elapsed wall-clock
//! duration or a failure marker. Failures travel through the same series as
//! measurements so the trial count is preserved, but they never contribute
//! to a statistic.

use std::fmt;

/// Why a trial did not produce a measurement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The command ran but exited unsuccessfully (`None` when killed by a signal)
    ExitStatus(Option<i32>),
    /// The command could not be launched or waited on
    Launch(String),
    /// The command exceeded the per-trial timeout and was killed
    TimedOut,
    /// The trial runner itself panicked
    Crashed(String),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::ExitStatus(Some(code)) => write!(f, "exited with status {}", code),
            FailureKind::ExitStatus(None) => write!(f, "terminated by signal"),
            FailureKind::Launch(message) => write!(f, "launch failed: {}", message),
            FailureKind::TimedOut => write!(f, "timed out"),
            FailureKind::Crashed(message) => write!(f, "runner crashed: {}", message),
        }
    }
}

/// Outcome of a single trial
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    /// Elapsed wall-clock time in seconds
    Elapsed(f64),
    /// The trial failed; excluded from every statistic
    Failed(FailureKind),
}

impl Sample {
    /// Sample from a measured duration
    pub fn from_duration(elapsed: std::time::Duration) -> Self {
        Sample::Elapsed(elapsed.as_secs_f64())
    }

    /// Seconds for a usable measurement, `None` for failures and invalid values
    pub fn seconds(&self) -> Option<f64> {
        match *self {
            Sample::Elapsed(secs) if secs.is_finite() && secs >= 0.0 => Some(secs),
            _ => None,
        }
    }

    /// Numeric view with NaN standing in for anything unusable
    pub fn as_f64(&self) -> f64 {
        self.seconds().unwrap_or(f64::NAN)
    }

    /// Whether this sample is a failure marker
    pub fn is_failed(&self) -> bool {
        matches!(self, Sample::Failed(_))
    }

    /// Failure reason, if any
    pub fn failure(&self) -> Option<&FailureKind> {
        match self {
            Sample::Failed(kind) => Some(kind),
            Sample::Elapsed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_elapsed_seconds() {
        let sample = Sample::from_duration(Duration::from_millis(1500));
        assert_eq!(sample.seconds(), Some(1.5));
        assert!(!sample.is_failed());
    }

    #[test]
    fn test_failed_is_nan() {
        let sample = Sample::Failed(FailureKind::ExitStatus(Some(1)));
        assert!(sample.seconds().is_none());
        assert!(sample.as_f64().is_nan());
        assert!(sample.is_failed());
    }

    #[test]
    fn test_invalid_elapsed_is_unusable() {
        assert!(Sample::Elapsed(f64::NAN).seconds().is_none());
        assert!(Sample::Elapsed(-1.0).seconds().is_none());
        assert!(Sample::Elapsed(f64::INFINITY).seconds().is_none());
    }

    #[test]
    fn test_failure_display() {
        assert_eq!(
            FailureKind::ExitStatus(Some(2)).to_string(),
            "exited with status 2"
        );
        assert_eq!(FailureKind::TimedOut.to_string(), "timed out");
    }
}
