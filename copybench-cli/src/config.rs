//! Configuration loading from copybench.toml
//!
//! CopyBench configuration can be specified in a `copybench.toml` file in the
//! directory the benchmark runs from. The configuration is automatically
//! discovered by walking up from the current directory; `--config` names a
//! file explicitly. Command-line flags override every value.

use copybench_core::{ProgramSet, Variant};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file name searched for during discovery
pub const CONFIG_FILE_NAME: &str = "copybench.toml";

/// CopyBench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CopyBenchConfig {
    /// Matrix axes
    #[serde(default)]
    pub matrix: MatrixConfig,
    /// Program invoked per variant
    #[serde(default)]
    pub programs: ProgramSet,
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Axes of the benchmark matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixConfig {
    /// Buffer sizes in bytes passed to buffered variants
    #[serde(default = "default_buffers")]
    pub buffers: Vec<usize>,
    /// Trials per (buffer, variant, file) series
    #[serde(default = "default_trials")]
    pub trials: usize,
    /// Source files to copy
    #[serde(default = "default_files")]
    pub files: Vec<PathBuf>,
    /// Variants to benchmark
    #[serde(default = "default_variants")]
    pub variants: Vec<Variant>,
    /// Shared directory for per-trial destination files
    #[serde(default = "default_tmp_dir")]
    pub tmp_dir: PathBuf,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            buffers: default_buffers(),
            trials: default_trials(),
            files: default_files(),
            variants: default_variants(),
            tmp_dir: default_tmp_dir(),
        }
    }
}

fn default_buffers() -> Vec<usize> {
    vec![1, 512, 1024]
}
fn default_trials() -> usize {
    20
}
fn default_files() -> Vec<PathBuf> {
    ["file-1B.bin", "file-100MB.bin", "file-1GB.bin"]
        .into_iter()
        .map(PathBuf::from)
        .collect()
}
fn default_variants() -> Vec<Variant> {
    Variant::ALL.to_vec()
}
fn default_tmp_dir() -> PathBuf {
    PathBuf::from("/tmp")
}

/// Runner configuration for trial execution
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunnerConfig {
    /// Worker count (defaults to a multiple of available cores, capped)
    #[serde(default)]
    pub jobs: Option<usize>,
    /// Per-trial timeout (e.g., "30s", "5m"); no timeout when unset
    #[serde(default)]
    pub trial_timeout: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human", "json", "csv"
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}

impl CopyBenchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    ///
    /// A file that exists but fails to parse is reported and ignored.
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => {
                        tracing::debug!(path = %config_path.display(), "loaded configuration");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %config_path.display(),
                            "Ignoring unreadable configuration: {}",
                            e
                        );
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# CopyBench Configuration

[matrix]
# Buffer sizes in bytes (passed as -b to unixcopy variants)
buffers = [1, 512, 1024]
# Trials per (buffer, variant, file) series
trials = 20
# Source files; all must exist before the run starts
files = ["file-1B.bin", "file-100MB.bin", "file-1GB.bin"]
# Variants: "unixcopy", "unixcopy-stdlib", "cp"
variants = ["unixcopy", "unixcopy-stdlib", "cp"]
# Shared directory for per-trial destination files
tmp_dir = "/tmp"

[programs]
unixcopy = "./unixcopy"
unixcopy-stdlib = "./unixcopy-stdlib"
cp = "cp"

[runner]
# Worker count (uncomment to override the core-based default)
# jobs = 8
# Kill trials running longer than this (uncomment to enable)
# trial_timeout = "5m"

[output]
# Output format: human, json, csv
format = "human"
"#
        .to_string()
    }

    /// Parse duration string (e.g., "3s", "500ms", "2m") to nanoseconds
    pub fn parse_duration(s: &str) -> anyhow::Result<u64> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        // Find where the number ends and unit begins
        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow::anyhow!("Invalid duration: {}", s));
        }

        let multiplier: u64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" | "" => 1_000_000_000,
            "m" | "min" => 60_000_000_000,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Ok((value * multiplier as f64) as u64)
    }
}
