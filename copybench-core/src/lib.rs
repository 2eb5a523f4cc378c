#![warn(missing_docs)]
//! CopyBench Core - Trial Runtime
//!
//! This crate provides the execution building blocks for a copy benchmark run:
//! - The configuration matrix and the work items it expands to
//! - `TrialRunner` / `ProcessRunner` for timing one external command
//! - `ResultTable`, the concurrency-safe accumulator keyed by series
//! - A monotonic `Timer`

mod accumulator;
mod matrix;
mod measure;
mod runner;

pub use accumulator::{CompletedTable, RecordError, ResultTable, Series};
pub use matrix::{Matrix, ProgramSet, WorkItem, destination_path, enumerate_work_items, program_tag};
pub use measure::Timer;
pub use runner::{ProcessRunner, TrialRunner};

pub use copybench_stats::{FailureKind, Sample};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Copy program variant under test
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Variant {
    /// Buffered copy built on raw system calls
    #[serde(rename = "unixcopy")]
    UnixCopy,
    /// Buffered copy built on stdio
    #[serde(rename = "unixcopy-stdlib")]
    UnixCopyStdlib,
    /// The system `cp`, no buffer parameter
    #[serde(rename = "cp")]
    SystemCopy,
}

impl Variant {
    /// Every variant, in report order
    pub const ALL: [Variant; 3] = [Variant::UnixCopy, Variant::UnixCopyStdlib, Variant::SystemCopy];

    /// Stable name used in config files, filters and series ids
    pub fn name(self) -> &'static str {
        match self {
            Variant::UnixCopy => "unixcopy",
            Variant::UnixCopyStdlib => "unixcopy-stdlib",
            Variant::SystemCopy => "cp",
        }
    }

    /// Program invoked when the configuration does not override it
    pub fn default_program(self) -> &'static str {
        match self {
            Variant::UnixCopy => "./unixcopy",
            Variant::UnixCopyStdlib => "./unixcopy-stdlib",
            Variant::SystemCopy => "cp",
        }
    }

    /// Whether the program accepts `-b <buffer_size>`
    pub fn takes_buffer(self) -> bool {
        !matches!(self, Variant::SystemCopy)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unixcopy" => Ok(Variant::UnixCopy),
            "unixcopy-stdlib" | "unixcopy_stdlib" | "stdlib" => Ok(Variant::UnixCopyStdlib),
            "cp" | "system" => Ok(Variant::SystemCopy),
            other => Err(format!("Unknown variant: {}", other)),
        }
    }
}

/// Identifies one series: every trial of a (buffer size, variant, source file)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey {
    /// Buffer size in bytes passed to buffered variants
    pub buffer_size: usize,
    /// Program variant
    pub variant: Variant,
    /// Source file being copied
    pub source: PathBuf,
}

impl SeriesKey {
    /// Create a series key
    pub fn new(buffer_size: usize, variant: Variant, source: impl Into<PathBuf>) -> Self {
        Self {
            buffer_size,
            variant,
            source: source.into(),
        }
    }

    /// Source basename, lossily converted for display
    pub fn source_name(&self) -> String {
        basename(&self.source)
    }

    /// Compact id, e.g. `b512/unixcopy/file-1B.bin`
    pub fn id(&self) -> String {
        format!("b{}/{}/{}", self.buffer_size, self.variant, self.source_name())
    }

    /// Coordinate of one trial within this series
    pub fn trial(&self, trial: usize) -> Coordinate {
        Coordinate {
            series: self.clone(),
            trial,
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// Logical coordinate of one trial
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    /// Series this trial belongs to
    pub series: SeriesKey,
    /// Trial index in `[0, trials)`
    pub trial: usize,
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.series, self.trial)
    }
}

pub(crate) fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
