#![warn(missing_docs)]
//! CopyBench Report - Report Model and Output
//!
//! Generates machine-readable output formats:
//! - JSON (full report)
//! - CSV (one row per series, spreadsheet-compatible)
//!
//! The human-readable rendering lives in the CLI.

mod csv;
mod json;
mod report;

pub use csv::generate_csv_report;
pub use json::{SCHEMA_VERSION, generate_json_report};
pub use report::{
    Report, ReportConfig, ReportMeta, ReportSummary, SeriesMetrics, SeriesReport, SystemInfo,
    TrialFailure,
};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// JSON with full schema
    Json,
    /// CSV for spreadsheets
    Csv,
    /// Human-readable terminal output
    #[default]
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_report() -> Report {
        Report {
            meta: ReportMeta {
                schema_version: SCHEMA_VERSION,
                version: "0.1.0".to_string(),
                timestamp: Utc::now(),
                system: SystemInfo {
                    os: "linux".to_string(),
                    arch: "x86_64".to_string(),
                    cpu: "test".to_string(),
                    cpu_cores: 4,
                    memory_gb: 8.0,
                },
            },
            config: ReportConfig {
                buffers: vec![512],
                variants: vec!["cp".to_string()],
                files: vec!["a.bin".to_string()],
                trials: 3,
                tmp_dir: "/tmp".to_string(),
                workers: 2,
                trial_timeout_ms: None,
            },
            series: vec![SeriesReport {
                id: "b512/cp/a.bin".to_string(),
                buffer_size: 512,
                variant: "cp".to_string(),
                program: "cp".to_string(),
                file: "a.bin".to_string(),
                samples: vec![Some(0.1), None, Some(0.3)],
                failures: vec![TrialFailure {
                    trial: 1,
                    reason: "exited with status 1".to_string(),
                }],
                metrics: SeriesMetrics {
                    valid: 2,
                    failed: 1,
                    mean: Some(0.2),
                    min: Some(0.1),
                    max: Some(0.3),
                    ..Default::default()
                },
            }],
            summary: ReportSummary {
                total_series: 1,
                total_trials: 3,
                succeeded: 2,
                failed: 1,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Human));
        assert!("html".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_json_marks_failures_null() {
        let json = generate_json_report(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let samples = &value["series"][0]["samples"];
        assert_eq!(samples[0], serde_json::json!(0.1));
        assert!(samples[1].is_null());
        assert!(value["series"][0]["metrics"]["excluded_min"].is_null());
        assert_eq!(value["summary"]["failed"], 1);
    }

    #[test]
    fn test_csv_row_per_series() {
        let csv = generate_csv_report(&sample_report());
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("buffer_size,variant,program,file"));
        assert!(lines[1].starts_with("512,cp,cp,a.bin,3,2,1,,,0.200000000"));
    }
}
