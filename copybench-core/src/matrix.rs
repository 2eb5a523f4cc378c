//! Configuration Matrix
//!
//! Expands the configured axes into independent work items:
//!
//! ```text
//! buffers × variants × sources × trials
//!        │
//!        ▼
//!   WorkItem { coordinate, program, args, destination }
//! ```
//!
//! Each item carries its full logical coordinate, so nothing downstream
//! depends on enumeration order.

use crate::{Coordinate, SeriesKey, Variant, basename};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Program invoked for each variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSet {
    /// Program for [`Variant::UnixCopy`]
    #[serde(default = "default_unixcopy")]
    pub unixcopy: String,
    /// Program for [`Variant::UnixCopyStdlib`]
    #[serde(default = "default_unixcopy_stdlib", rename = "unixcopy-stdlib")]
    pub unixcopy_stdlib: String,
    /// Program for [`Variant::SystemCopy`]
    #[serde(default = "default_cp")]
    pub cp: String,
}

impl Default for ProgramSet {
    fn default() -> Self {
        Self {
            unixcopy: default_unixcopy(),
            unixcopy_stdlib: default_unixcopy_stdlib(),
            cp: default_cp(),
        }
    }
}

fn default_unixcopy() -> String {
    Variant::UnixCopy.default_program().to_string()
}
fn default_unixcopy_stdlib() -> String {
    Variant::UnixCopyStdlib.default_program().to_string()
}
fn default_cp() -> String {
    Variant::SystemCopy.default_program().to_string()
}

impl ProgramSet {
    /// Program string for a variant
    pub fn program(&self, variant: Variant) -> &str {
        match variant {
            Variant::UnixCopy => &self.unixcopy,
            Variant::UnixCopyStdlib => &self.unixcopy_stdlib,
            Variant::SystemCopy => &self.cp,
        }
    }

    /// Override the program for a variant
    pub fn set(&mut self, variant: Variant, program: impl Into<String>) {
        let slot = match variant {
            Variant::UnixCopy => &mut self.unixcopy,
            Variant::UnixCopyStdlib => &mut self.unixcopy_stdlib,
            Variant::SystemCopy => &mut self.cp,
        };
        *slot = program.into();
    }
}

/// One fully specified execution unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Logical coordinate the sample is recorded under
    pub coordinate: Coordinate,
    /// Program to launch
    pub program: OsString,
    /// Arguments after the program name
    pub args: Vec<OsString>,
    /// File the command is expected to create; removed after the trial
    pub destination: PathBuf,
}

impl WorkItem {
    /// Build the copy command for a coordinate
    ///
    /// Buffered variants get `-b <buffer> <source> <destination>`, the system
    /// copy gets `<source> <destination>`.
    pub fn for_coordinate(coordinate: Coordinate, programs: &ProgramSet, tmp_dir: &Path) -> Self {
        let series = &coordinate.series;
        let program = programs.program(series.variant);
        let destination = destination_path(
            tmp_dir,
            &series.source,
            program,
            series.variant,
            series.buffer_size,
            coordinate.trial,
        );

        let mut args: Vec<OsString> = Vec::with_capacity(4);
        if series.variant.takes_buffer() {
            args.push("-b".into());
            args.push(series.buffer_size.to_string().into());
        }
        args.push(series.source.clone().into_os_string());
        args.push(destination.clone().into_os_string());

        Self {
            coordinate,
            program: program.into(),
            args,
            destination,
        }
    }

    /// Arbitrary command under a coordinate (custom runners and tests)
    pub fn new(
        coordinate: Coordinate,
        program: impl Into<OsString>,
        args: impl IntoIterator<Item = impl Into<OsString>>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            coordinate,
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            destination: destination.into(),
        }
    }

    /// Space-joined command line for diagnostics
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Program tag used in destination names: `./unixcopy` → `unixcopy`, `bin/cp` → `bin_cp`
pub fn program_tag(program: &str) -> String {
    program.replace("./", "").replace('/', "_")
}

/// Per-trial destination: `<tmp>/<basename>.<tag>.<variant>.b<buffer>.run<trial>`
///
/// Variant names contain no dots, so the name splits unambiguously from the
/// right. Unique per coordinate as long as source basenames are unique, even
/// when several variants share one program.
pub fn destination_path(
    tmp_dir: &Path,
    source: &Path,
    program: &str,
    variant: Variant,
    buffer_size: usize,
    trial: usize,
) -> PathBuf {
    tmp_dir.join(format!(
        "{}.{}.{}.b{}.run{}",
        basename(source),
        program_tag(program),
        variant.name(),
        buffer_size,
        trial
    ))
}

/// Expand series × trials into work items
pub fn enumerate_work_items(
    series: &[SeriesKey],
    trials: usize,
    programs: &ProgramSet,
    tmp_dir: &Path,
) -> Vec<WorkItem> {
    let mut items = Vec::with_capacity(series.len() * trials);
    for key in series {
        for trial in 0..trials {
            items.push(WorkItem::for_coordinate(key.trial(trial), programs, tmp_dir));
        }
    }
    items
}

/// The configured axes of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    buffers: Vec<usize>,
    variants: Vec<Variant>,
    sources: Vec<PathBuf>,
    trials: usize,
    tmp_dir: PathBuf,
}

impl Matrix {
    /// Create a matrix; repeated axis values are dropped, first occurrence wins
    pub fn new(
        buffers: impl IntoIterator<Item = usize>,
        variants: impl IntoIterator<Item = Variant>,
        sources: impl IntoIterator<Item = impl Into<PathBuf>>,
        trials: usize,
        tmp_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            buffers: dedup(buffers),
            variants: dedup(variants),
            sources: dedup(sources.into_iter().map(Into::into)),
            trials,
            tmp_dir: tmp_dir.into(),
        }
    }

    /// Buffer sizes in configured order
    pub fn buffers(&self) -> &[usize] {
        &self.buffers
    }

    /// Variants in configured order
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Source files in configured order
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Trials per series
    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Shared temporary directory for destinations
    pub fn tmp_dir(&self) -> &Path {
        &self.tmp_dir
    }

    /// Every series, grouped by buffer size, then variant, then source
    pub fn series_keys(&self) -> Vec<SeriesKey> {
        let mut keys = Vec::with_capacity(self.series_count());
        for &buffer_size in &self.buffers {
            for &variant in &self.variants {
                for source in &self.sources {
                    keys.push(SeriesKey::new(buffer_size, variant, source.clone()));
                }
            }
        }
        keys
    }

    /// Number of series
    pub fn series_count(&self) -> usize {
        self.buffers.len() * self.variants.len() * self.sources.len()
    }

    /// Total number of work items
    pub fn len(&self) -> usize {
        self.series_count() * self.trials
    }

    /// Whether the matrix has no work
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every work item of the matrix
    pub fn work_items(&self, programs: &ProgramSet) -> Vec<WorkItem> {
        enumerate_work_items(&self.series_keys(), self.trials, programs, &self.tmp_dir)
    }
}

fn dedup<T: PartialEq>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut unique = Vec::new();
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample_matrix() -> Matrix {
        Matrix::new(
            [1, 512, 1024],
            Variant::ALL,
            ["file-1B.bin", "file-100MB.bin"],
            4,
            "/tmp",
        )
    }

    #[test]
    fn test_enumeration_complete_and_unique() {
        let matrix = sample_matrix();
        let items = matrix.work_items(&ProgramSet::default());

        assert_eq!(matrix.len(), 3 * 3 * 2 * 4);
        assert_eq!(items.len(), matrix.len());

        let coordinates: HashSet<_> = items.iter().map(|i| i.coordinate.clone()).collect();
        assert_eq!(coordinates.len(), items.len());

        let destinations: HashSet<_> = items.iter().map(|i| i.destination.clone()).collect();
        assert_eq!(destinations.len(), items.len());
    }

    #[test]
    fn test_series_order() {
        let keys = sample_matrix().series_keys();

        assert_eq!(keys.len(), 18);
        assert_eq!(keys[0], SeriesKey::new(1, Variant::UnixCopy, "file-1B.bin"));
        assert_eq!(keys[1], SeriesKey::new(1, Variant::UnixCopy, "file-100MB.bin"));
        assert_eq!(keys[2].variant, Variant::UnixCopyStdlib);
        assert_eq!(keys[6].buffer_size, 512);
    }

    #[test]
    fn test_axes_deduplicated() {
        let matrix = Matrix::new([512, 512, 1], [Variant::SystemCopy], ["a", "a"], 2, "/tmp");

        assert_eq!(matrix.buffers(), &[512, 1]);
        assert_eq!(matrix.sources().len(), 1);
        assert_eq!(matrix.len(), 4);
    }

    #[test]
    fn test_buffered_command() {
        let key = SeriesKey::new(512, Variant::UnixCopy, "data/file-1B.bin");
        let item = WorkItem::for_coordinate(key.trial(3), &ProgramSet::default(), Path::new("/tmp"));

        assert_eq!(item.program, OsString::from("./unixcopy"));
        assert_eq!(
            item.command_line(),
            "./unixcopy -b 512 data/file-1B.bin /tmp/file-1B.bin.unixcopy.unixcopy.b512.run3"
        );
    }

    #[test]
    fn test_system_copy_has_no_buffer_flag() {
        let key = SeriesKey::new(1024, Variant::SystemCopy, "file-1GB.bin");
        let item = WorkItem::for_coordinate(key.trial(0), &ProgramSet::default(), Path::new("/tmp"));

        assert_eq!(
            item.command_line(),
            "cp file-1GB.bin /tmp/file-1GB.bin.cp.cp.b1024.run0"
        );
    }

    #[test]
    fn test_program_override() {
        let mut programs = ProgramSet::default();
        programs.set(Variant::UnixCopyStdlib, "build/bin/unixcopy-stdlib");

        assert_eq!(program_tag(programs.program(Variant::UnixCopyStdlib)), "build_bin_unixcopy-stdlib");
        assert_eq!(program_tag("./unixcopy"), "unixcopy");
    }

    #[test]
    fn test_destinations_distinct_when_programs_shared() {
        let matrix = Matrix::new([512], Variant::ALL, ["a.bin"], 2, "/tmp");
        let mut programs = ProgramSet::default();
        programs.set(Variant::UnixCopy, "a/b");
        programs.set(Variant::UnixCopyStdlib, "a_b");
        programs.set(Variant::SystemCopy, "a/b");
        assert_eq!(program_tag("a/b"), program_tag("a_b"));

        let items = matrix.work_items(&programs);
        let destinations: HashSet<_> = items.iter().map(|i| i.destination.clone()).collect();
        assert_eq!(destinations.len(), items.len());
    }

    #[test]
    fn test_empty_axis() {
        let matrix = Matrix::new(Vec::<usize>::new(), Variant::ALL, ["a"], 5, "/tmp");
        assert!(matrix.is_empty());
        assert!(matrix.work_items(&ProgramSet::default()).is_empty());
    }
}
