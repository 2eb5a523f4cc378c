#![warn(missing_docs)]
//! CopyBench CLI Library
//!
//! Command-line driver for copy benchmarks: parses flags, layers them over
//! `copybench.toml`, validates the matrix, runs every trial on a bounded
//! worker pool and prints the report.
//!
//! # Example
//!
//! ```ignore
//! fn main() {
//!     if let Err(e) = copybench_cli::run() {
//!         eprintln!("error: {e:#}");
//!         std::process::exit(1);
//!     }
//! }
//! ```

mod config;
mod dispatcher;
mod executor;
mod planner;

pub use config::*;
pub use dispatcher::{
    DispatchError, Dispatcher, WORKER_CEILING, WORKERS_PER_CORE, clamp_workers, default_workers,
};
pub use executor::{
    ExecutionConfig, Executor, RunOutcome, build_report, compute_statistics, format_human_output,
};
pub use planner::{ExecutionPlan, PlanError, build_plan, compile_filter, resolve_program};

use anyhow::Context;
use clap::{Parser, Subcommand};
use copybench_core::{Matrix, ProgramSet, Variant};
use copybench_report::{OutputFormat, generate_csv_report, generate_json_report};
use regex::Regex;
use std::path::PathBuf;
use std::time::Duration;

/// CopyBench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "copybench")]
#[command(author, version, about = "CopyBench - concurrent benchmark of file copy programs")]
pub struct Cli {
    /// Optional subcommand (List, Run); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Filter series by regex on their id, e.g. "^b512/cp/"
    pub filter: Option<String>,

    /// Buffer sizes in bytes, comma-separated
    #[arg(short, long, value_delimiter = ',')]
    pub buffers: Vec<usize>,

    /// Trials per (buffer, variant, file) series
    #[arg(short = 'n', long)]
    pub trials: Option<usize>,

    /// Source files, comma-separated
    #[arg(short, long, value_delimiter = ',')]
    pub files: Vec<PathBuf>,

    /// Restrict to a variant: unixcopy, unixcopy-stdlib, cp (repeatable)
    #[arg(long = "variant")]
    pub variants: Vec<Variant>,

    /// Shared directory for per-trial destination files
    #[arg(long)]
    pub tmp_dir: Option<PathBuf>,

    /// Number of concurrent trials
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Kill trials running longer than this, e.g. "30s", "5m"
    #[arg(long)]
    pub trial_timeout: Option<String>,

    /// Output format: human, json, csv
    #[arg(long)]
    pub format: Option<String>,

    /// Configuration file (default: discover copybench.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Dry run - print the plan without executing
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the planned series and trial count
    List,
    /// Run the benchmark (default)
    Run,
}

/// Effective settings after layering CLI flags over the config file
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Matrix axes
    pub matrix: Matrix,
    /// Program invoked per variant
    pub programs: ProgramSet,
    /// Series filter
    pub filter: Option<Regex>,
    /// Worker pool and timeout settings
    pub execution: ExecutionConfig,
    /// Report format
    pub format: OutputFormat,
}

/// Run the CopyBench CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if the run could not start.
/// Failed trials are part of the report, not errors.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the CopyBench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let settings = resolve_settings(&cli, &config)?;

    match cli.command {
        Some(Commands::List) => list_plan(&settings),
        Some(Commands::Run) => run_benchmark(&settings),
        None if cli.dry_run => list_plan(&settings),
        None => run_benchmark(&settings),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "copybench=debug"
    } else {
        "copybench=info"
    };
    // A subscriber may already be installed when embedded or under test
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Explicit `--config` must load; otherwise discover `copybench.toml`
fn load_config(cli: &Cli) -> anyhow::Result<CopyBenchConfig> {
    match &cli.config {
        Some(path) => CopyBenchConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(CopyBenchConfig::discover().unwrap_or_default()),
    }
}

/// Layer CLI flags over the configuration: flag > config file > default
pub fn resolve_settings(cli: &Cli, config: &CopyBenchConfig) -> anyhow::Result<RunSettings> {
    let m = &config.matrix;

    let buffers = if cli.buffers.is_empty() {
        m.buffers.clone()
    } else {
        cli.buffers.clone()
    };
    let files = if cli.files.is_empty() {
        m.files.clone()
    } else {
        cli.files.clone()
    };
    let variants = if cli.variants.is_empty() {
        m.variants.clone()
    } else {
        cli.variants.clone()
    };
    let trials = cli.trials.unwrap_or(m.trials);
    let tmp_dir = cli.tmp_dir.clone().unwrap_or_else(|| m.tmp_dir.clone());

    let workers = match cli.jobs.or(config.runner.jobs) {
        Some(requested) => {
            let workers = clamp_workers(requested);
            if workers != requested {
                tracing::warn!(
                    "Requested {} workers, using {} (allowed range 1..={})",
                    requested,
                    workers,
                    WORKER_CEILING
                );
            }
            workers
        }
        None => default_workers(),
    };

    let trial_timeout = match cli
        .trial_timeout
        .as_deref()
        .or(config.runner.trial_timeout.as_deref())
    {
        Some(text) => {
            let nanos = CopyBenchConfig::parse_duration(text)
                .with_context(|| format!("invalid trial timeout '{}'", text))?;
            if nanos == 0 {
                anyhow::bail!("trial timeout must be greater than zero");
            }
            Some(Duration::from_nanos(nanos))
        }
        None => None,
    };

    let format: OutputFormat = cli
        .format
        .as_deref()
        .unwrap_or(&config.output.format)
        .parse()
        .map_err(anyhow::Error::msg)?;

    let filter = compile_filter(cli.filter.as_deref().unwrap_or_default())?;

    Ok(RunSettings {
        matrix: Matrix::new(buffers, variants, files, trials, tmp_dir),
        programs: config.programs.clone(),
        filter,
        execution: ExecutionConfig {
            workers,
            trial_timeout,
            show_progress: true,
        },
        format,
    })
}

fn plan(settings: &RunSettings) -> Result<ExecutionPlan, PlanError> {
    build_plan(
        settings.matrix.clone(),
        settings.programs.clone(),
        settings.filter.as_ref(),
    )
}

fn list_plan(settings: &RunSettings) -> anyhow::Result<()> {
    let plan = plan(settings)?;
    print!("{}", format_plan(&plan));
    Ok(())
}

/// Render the plan as a tree grouped by buffer size
pub fn format_plan(plan: &ExecutionPlan) -> String {
    let mut output = String::from("CopyBench Plan:\n");

    let mut current_buffer = None;
    for key in &plan.series {
        if current_buffer != Some(key.buffer_size) {
            current_buffer = Some(key.buffer_size);
            output.push_str(&format!("├── buffer: {} bytes\n", key.buffer_size));
        }
        output.push_str(&format!(
            "│   ├── {} ({})\n",
            key.id(),
            plan.programs.program(key.variant)
        ));
    }

    output.push_str(&format!(
        "{} series x {} trials = {} trials planned.\n",
        plan.series.len(),
        plan.trials(),
        plan.total_trials()
    ));
    output
}

fn run_benchmark(settings: &RunSettings) -> anyhow::Result<()> {
    let plan = plan(settings)?;

    if plan.is_empty() {
        eprintln!("No series match the filter.");
        return Ok(());
    }

    eprintln!(
        "Running {} series x {} trials with {} worker(s)...\n",
        plan.series.len(),
        plan.trials(),
        settings.execution.workers
    );

    let executor = Executor::new(settings.execution.clone());
    let outcome = executor.execute(&plan)?;
    let stats = compute_statistics(&outcome.table);
    let report = build_report(&plan, &settings.execution, &outcome, &stats);

    let output = match settings.format {
        OutputFormat::Json => generate_json_report(&report)?,
        OutputFormat::Csv => generate_csv_report(&report),
        OutputFormat::Human => format_human_output(&report),
    };
    print!("{}", output);

    if report.summary.failed > 0 {
        eprintln!(
            "{} of {} trial(s) failed; see the report for details",
            report.summary.failed, report.summary.total_trials
        );
    }

    Ok(())
}
