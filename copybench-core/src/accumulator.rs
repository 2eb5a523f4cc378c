//! Result Accumulator
//!
//! Concurrency-safe store of trial samples keyed by series.
//!
//! Every series is registered up front with one empty slot per trial.
//! `record` fills the slot addressed by the coordinate's trial index, so the
//! finished table holds exactly one sample per work item regardless of the
//! order in which trials complete: a second write to a slot is rejected and
//! an unfilled slot makes `finish` fail.

use crate::{Coordinate, Matrix, SeriesKey};
use copybench_stats::Sample;
use fxhash::FxHashMap;
use std::sync::Mutex;
use thiserror::Error;

/// Accumulator invariant violations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("No series registered for {0}")]
    UnknownSeries(String),

    #[error("Trial {trial} out of range for {series} ({trials} trials)")]
    TrialOutOfRange {
        series: String,
        trial: usize,
        trials: usize,
    },

    #[error("Sample for {series} trial {trial} recorded twice")]
    Duplicate { series: String, trial: usize },

    #[error("{missing} sample(s) never recorded")]
    Incomplete { missing: usize },
}

/// Mutable table shared by dispatcher threads during a run
#[derive(Debug)]
pub struct ResultTable {
    order: Vec<SeriesKey>,
    trials: usize,
    slots: Mutex<FxHashMap<SeriesKey, Vec<Option<Sample>>>>,
}

impl ResultTable {
    /// Register `series` with `trials` empty slots each
    pub fn new(series: impl IntoIterator<Item = SeriesKey>, trials: usize) -> Self {
        let mut order = Vec::new();
        let mut slots = FxHashMap::default();
        for key in series {
            if slots.contains_key(&key) {
                continue;
            }
            slots.insert(key.clone(), vec![None; trials]);
            order.push(key);
        }

        Self {
            order,
            trials,
            slots: Mutex::new(slots),
        }
    }

    /// Table covering every series of a matrix
    pub fn for_matrix(matrix: &Matrix) -> Self {
        Self::new(matrix.series_keys(), matrix.trials())
    }

    /// Trials per series
    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Registered series in registration order
    pub fn series_keys(&self) -> &[SeriesKey] {
        &self.order
    }

    /// Store the sample for one coordinate
    ///
    /// Safe to call from any number of threads at once.
    pub fn record(&self, coordinate: &Coordinate, sample: Sample) -> Result<(), RecordError> {
        let mut slots = self.lock();
        let series = slots
            .get_mut(&coordinate.series)
            .ok_or_else(|| RecordError::UnknownSeries(coordinate.series.id()))?;

        let slot = series
            .get_mut(coordinate.trial)
            .ok_or_else(|| RecordError::TrialOutOfRange {
                series: coordinate.series.id(),
                trial: coordinate.trial,
                trials: self.trials,
            })?;

        if slot.is_some() {
            return Err(RecordError::Duplicate {
                series: coordinate.series.id(),
                trial: coordinate.trial,
            });
        }

        *slot = Some(sample);
        Ok(())
    }

    /// Number of filled slots
    pub fn recorded(&self) -> usize {
        self.lock()
            .values()
            .map(|series| series.iter().filter(|slot| slot.is_some()).count())
            .sum()
    }

    /// Freeze the table; fails unless every slot was filled
    pub fn finish(self) -> Result<CompletedTable, RecordError> {
        let mut slots = self
            .slots
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let missing: usize = slots
            .values()
            .map(|series| series.iter().filter(|slot| slot.is_none()).count())
            .sum();
        if missing > 0 {
            return Err(RecordError::Incomplete { missing });
        }

        let series = self
            .order
            .into_iter()
            .map(|key| {
                let samples = slots
                    .remove(&key)
                    .unwrap_or_default()
                    .into_iter()
                    .flatten()
                    .collect();
                Series { key, samples }
            })
            .collect();

        Ok(CompletedTable {
            trials: self.trials,
            series,
        })
    }

    // The critical section is a single slot write, so a panic elsewhere
    // cannot leave the map half-updated
    fn lock(&self) -> std::sync::MutexGuard<'_, FxHashMap<SeriesKey, Vec<Option<Sample>>>> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// All samples of one series, indexed by trial
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Series identity
    pub key: SeriesKey,
    /// One sample per trial, `samples[i]` is trial `i`
    pub samples: Vec<Sample>,
}

impl Series {
    /// Number of failed trials
    pub fn failed(&self) -> usize {
        self.samples.iter().filter(|s| s.is_failed()).count()
    }
}

/// Read-only table after every trial has been recorded
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedTable {
    trials: usize,
    series: Vec<Series>,
}

impl CompletedTable {
    /// Trials per series
    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Series in registration order
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Look up one series
    pub fn get(&self, key: &SeriesKey) -> Option<&Series> {
        self.series.iter().find(|s| &s.key == key)
    }

    /// Total number of samples
    pub fn total_samples(&self) -> usize {
        self.series.iter().map(|s| s.samples.len()).sum()
    }

    /// Total number of failed samples
    pub fn failed_samples(&self) -> usize {
        self.series.iter().map(Series::failed).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Variant;
    use copybench_stats::FailureKind;

    fn keys() -> Vec<SeriesKey> {
        vec![
            SeriesKey::new(1, Variant::UnixCopy, "a.bin"),
            SeriesKey::new(1, Variant::SystemCopy, "a.bin"),
        ]
    }

    #[test]
    fn test_starts_empty() {
        let table = ResultTable::new(keys(), 3);

        assert_eq!(table.recorded(), 0);
        assert_eq!(table.series_keys().len(), 2);
        assert_eq!(table.finish(), Err(RecordError::Incomplete { missing: 6 }));
    }

    #[test]
    fn test_out_of_order_records_land_in_slots() {
        let keys = keys();
        let table = ResultTable::new(keys.clone(), 2);

        table.record(&keys[1].trial(1), Sample::Elapsed(4.0)).unwrap();
        table.record(&keys[0].trial(1), Sample::Elapsed(2.0)).unwrap();
        table
            .record(&keys[1].trial(0), Sample::Failed(FailureKind::TimedOut))
            .unwrap();
        table.record(&keys[0].trial(0), Sample::Elapsed(1.0)).unwrap();

        let completed = table.finish().unwrap();
        assert_eq!(completed.total_samples(), 4);
        assert_eq!(completed.failed_samples(), 1);
        assert_eq!(completed.series()[0].key, keys[0]);
        assert_eq!(
            completed.series()[0].samples,
            vec![Sample::Elapsed(1.0), Sample::Elapsed(2.0)]
        );
        assert_eq!(completed.get(&keys[1]).unwrap().failed(), 1);
    }

    #[test]
    fn test_duplicate_rejected() {
        let keys = keys();
        let table = ResultTable::new(keys.clone(), 2);

        table.record(&keys[0].trial(0), Sample::Elapsed(1.0)).unwrap();
        let err = table
            .record(&keys[0].trial(0), Sample::Elapsed(9.0))
            .unwrap_err();

        assert!(matches!(err, RecordError::Duplicate { trial: 0, .. }));
        assert_eq!(table.recorded(), 1);
    }

    #[test]
    fn test_out_of_range_and_unknown() {
        let keys = keys();
        let table = ResultTable::new(keys.clone(), 2);

        assert!(matches!(
            table.record(&keys[0].trial(2), Sample::Elapsed(1.0)),
            Err(RecordError::TrialOutOfRange { trial: 2, trials: 2, .. })
        ));

        let stranger = SeriesKey::new(4096, Variant::UnixCopy, "a.bin");
        assert!(matches!(
            table.record(&stranger.trial(0), Sample::Elapsed(1.0)),
            Err(RecordError::UnknownSeries(_))
        ));
    }

    #[test]
    fn test_repeated_series_registered_once() {
        let mut keys = keys();
        keys.push(keys[0].clone());
        let table = ResultTable::new(keys, 1);

        assert_eq!(table.series_keys().len(), 2);
    }

    #[test]
    fn test_concurrent_records() {
        let matrix = Matrix::new([1, 2, 3], Variant::ALL, ["a", "b"], 16, "/tmp");
        let table = ResultTable::for_matrix(&matrix);
        let keys = matrix.series_keys();

        std::thread::scope(|scope| {
            // One writer per trial index, each touching every series
            for trial in 0..matrix.trials() {
                let table = &table;
                let keys = &keys;
                scope.spawn(move || {
                    for key in keys {
                        table
                            .record(&key.trial(trial), Sample::Elapsed(trial as f64))
                            .unwrap();
                    }
                });
            }
        });

        assert_eq!(table.recorded(), matrix.len());
        let completed = table.finish().unwrap();
        for series in completed.series() {
            let expected: Vec<_> = (0..16).map(|t| Sample::Elapsed(t as f64)).collect();
            assert_eq!(series.samples, expected);
        }
    }
}
