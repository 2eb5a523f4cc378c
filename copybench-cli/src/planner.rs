//! Run Planner
//!
//! Validates the configured matrix and expands it into an execution plan.
//!
//! Everything that can make the whole run meaningless is checked here, once,
//! before the first trial starts:
//! - Empty axes, zero trials or a zero buffer size
//! - Missing source files (all of them are reported together)
//! - Source files sharing a basename, which would collide on destination paths
//! - A missing temporary directory
//! - Copy programs that cannot be resolved
//!
//! An optional regex keeps only the series whose id
//! (`b<buffer>/<variant>/<basename>`) matches. Validation then applies to
//! what remains selected.

use copybench_core::{Matrix, ProgramSet, SeriesKey, Variant, WorkItem, enumerate_work_items};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Startup validation failures
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Invalid matrix: {0}")]
    InvalidMatrix(String),

    #[error("Source file(s) not found: {}", display_paths(.0))]
    MissingSources(Vec<PathBuf>),

    #[error("Source files share the basename '{name}': {}", display_paths(.paths))]
    DuplicateBasename { name: String, paths: Vec<PathBuf> },

    #[error("Temporary directory unavailable: {}", .0.display())]
    TempDirUnavailable(PathBuf),

    #[error("Program for variant '{variant}' not found or not executable: {program}")]
    ProgramNotFound { variant: Variant, program: String },

    #[error("Invalid filter pattern: {0}")]
    InvalidFilter(#[from] regex::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validated work for one run
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    /// Configured axes
    pub matrix: Matrix,
    /// Program invoked per variant
    pub programs: ProgramSet,
    /// Selected series in report order
    pub series: Vec<SeriesKey>,
    /// One item per (selected series, trial)
    pub items: Vec<WorkItem>,
}

impl ExecutionPlan {
    /// Trials per series
    pub fn trials(&self) -> usize {
        self.matrix.trials()
    }

    /// Total number of trials to execute
    pub fn total_trials(&self) -> usize {
        self.items.len()
    }

    /// Whether the filter left nothing to run
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Compile the series filter; `None` for an empty pattern
pub fn compile_filter(pattern: &str) -> Result<Option<Regex>, PlanError> {
    if pattern.is_empty() {
        return Ok(None);
    }
    Ok(Some(Regex::new(pattern)?))
}

/// Validate the matrix and build the execution plan
///
/// Series keep matrix order (buffer, then variant, then source).
pub fn build_plan(
    matrix: Matrix,
    programs: ProgramSet,
    filter: Option<&Regex>,
) -> Result<ExecutionPlan, PlanError> {
    validate_axes(&matrix)?;

    let series: Vec<SeriesKey> = matrix
        .series_keys()
        .into_iter()
        .filter(|key| filter.is_none_or(|re| re.is_match(&key.id())))
        .collect();

    if !series.is_empty() {
        validate_sources(&series)?;
        validate_tmp_dir(matrix.tmp_dir())?;
        validate_programs(&series, &programs)?;
    }

    let items = enumerate_work_items(&series, matrix.trials(), &programs, matrix.tmp_dir());
    tracing::debug!(
        series = series.len(),
        items = items.len(),
        "execution plan built"
    );

    Ok(ExecutionPlan {
        matrix,
        programs,
        series,
        items,
    })
}

fn validate_axes(matrix: &Matrix) -> Result<(), PlanError> {
    if matrix.buffers().is_empty() {
        return Err(PlanError::InvalidMatrix("no buffer sizes".to_string()));
    }
    if matrix.buffers().contains(&0) {
        return Err(PlanError::InvalidMatrix(
            "buffer size must be at least 1 byte".to_string(),
        ));
    }
    if matrix.variants().is_empty() {
        return Err(PlanError::InvalidMatrix("no variants".to_string()));
    }
    if matrix.sources().is_empty() {
        return Err(PlanError::InvalidMatrix("no source files".to_string()));
    }
    if matrix.trials() == 0 {
        return Err(PlanError::InvalidMatrix(
            "trial count must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Distinct sources of the selected series, in first-seen order
fn selected_sources(series: &[SeriesKey]) -> Vec<&Path> {
    let mut sources: Vec<&Path> = Vec::new();
    for key in series {
        if !sources.contains(&key.source.as_path()) {
            sources.push(&key.source);
        }
    }
    sources
}

fn validate_sources(series: &[SeriesKey]) -> Result<(), PlanError> {
    let sources = selected_sources(series);

    let missing: Vec<PathBuf> = sources
        .iter()
        .filter(|path| !path.is_file())
        .map(|path| path.to_path_buf())
        .collect();
    if !missing.is_empty() {
        return Err(PlanError::MissingSources(missing));
    }

    let mut by_name: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for source in sources {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        by_name.entry(name).or_default().push(source.to_path_buf());
    }
    if let Some((name, paths)) = by_name.into_iter().find(|(_, paths)| paths.len() > 1) {
        return Err(PlanError::DuplicateBasename { name, paths });
    }

    Ok(())
}

fn validate_tmp_dir(tmp_dir: &Path) -> Result<(), PlanError> {
    if tmp_dir.is_dir() {
        Ok(())
    } else {
        Err(PlanError::TempDirUnavailable(tmp_dir.to_path_buf()))
    }
}

fn validate_programs(series: &[SeriesKey], programs: &ProgramSet) -> Result<(), PlanError> {
    let mut checked: Vec<Variant> = Vec::new();
    for key in series {
        if checked.contains(&key.variant) {
            continue;
        }
        checked.push(key.variant);

        let program = programs.program(key.variant);
        match resolve_program(program) {
            Some(path) => {
                tracing::debug!(variant = %key.variant, path = %path.display(), "resolved program")
            }
            None => {
                return Err(PlanError::ProgramNotFound {
                    variant: key.variant,
                    program: program.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Locate a program the way a shell would
///
/// A name containing a path separator is taken as a path and must be an
/// executable file. A bare name is searched on `PATH`.
pub fn resolve_program(program: &str) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }

    if program.contains(std::path::MAIN_SEPARATOR) || program.contains('/') {
        let path = PathBuf::from(program);
        return is_executable(&path).then_some(path);
    }

    let search_path = std::env::var_os("PATH")?;
    std::env::split_paths(&search_path)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}
