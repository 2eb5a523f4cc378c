//! Output Formatting
//!
//! Human-readable rendering of a copy benchmark report.
//!
//! Results are grouped by buffer size, then variant, then source file, in
//! matrix order. Each series shows its raw runs (6 decimals, `nan` for
//! failed trials), the excluded extremes, the trimmed mean and both
//! deviations together with the values they were derived from.

use copybench_report::{Report, SeriesReport};

const BANNER_WIDTH: usize = 80;

/// Format a report for human-readable terminal display
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("CopyBench Results\n");

    let mut current_buffer: Option<usize> = None;
    let mut current_variant: Option<&str> = None;

    for series in &report.series {
        if current_buffer != Some(series.buffer_size) {
            current_buffer = Some(series.buffer_size);
            current_variant = None;
            output.push_str(&"=".repeat(BANNER_WIDTH));
            output.push('\n');
            output.push_str(&format!("Buffer size: {} bytes\n", series.buffer_size));
            output.push_str(&"=".repeat(BANNER_WIDTH));
            output.push_str("\n\n");
        }

        if current_variant != Some(series.variant.as_str()) {
            current_variant = Some(series.variant.as_str());
            output.push_str(&format!("Program: {} ({})\n", series.program, series.variant));
            output.push_str(&"-".repeat(BANNER_WIDTH));
            output.push('\n');
        }

        format_series(&mut output, series);
        output.push('\n');
    }

    format_summary(&mut output, report);
    output
}

fn format_series(output: &mut String, series: &SeriesReport) {
    let m = &series.metrics;
    let total = series.samples.len();

    output.push_str(&format!("  File: {}\n", series.file));

    let runs: Vec<String> = series
        .samples
        .iter()
        .map(|s| s.map_or_else(|| "nan".to_string(), |v| format!("{:.6}", v)))
        .collect();
    output.push_str(&format!("    runs: [{}]\n", runs.join(", ")));

    match (m.excluded_min, m.excluded_max) {
        (Some(min), Some(max)) => output.push_str(&format!(
            "    excluded: min {:.6} s, max {:.6} s\n",
            min, max
        )),
        _ => output.push_str("    excluded: none (fewer than 3 valid runs)\n"),
    }

    match m.mean {
        Some(mean) => {
            output.push_str(&format!(
                "    mean: {:.6} s over {} run(s) ({}/{} valid)\n",
                mean,
                m.remaining(),
                m.valid,
                total
            ));
            if let (Some(max), Some(dev)) = (m.max, m.positive_deviation) {
                output.push_str(&format!(
                    "    +dev: {:.6} s (max {:.6} - mean {:.6})\n",
                    dev, max, mean
                ));
            }
            if let (Some(min), Some(dev)) = (m.min, m.negative_deviation) {
                output.push_str(&format!(
                    "    -dev: {:.6} s (mean {:.6} - min {:.6})\n",
                    dev, mean, min
                ));
            }
            if let Some(std_dev) = m.std_dev {
                output.push_str(&format!("    pstdev: {:.6} s\n", std_dev));
            }
        }
        None => {
            output.push_str(&format!("    mean: nan (0/{} valid)\n", total));
            output.push_str("    +dev: nan\n");
            output.push_str("    -dev: nan\n");
        }
    }

    for failure in &series.failures {
        output.push_str(&format!(
            "    failed: run {} {}\n",
            failure.trial, failure.reason
        ));
    }
}

fn format_summary(output: &mut String, report: &Report) {
    let s = &report.summary;

    output.push_str("Summary\n");
    output.push_str(&"-".repeat(BANNER_WIDTH));
    output.push('\n');
    output.push_str(&format!(
        "  {} series, {} trials: {} succeeded, {} failed\n",
        s.total_series, s.total_trials, s.succeeded, s.failed
    ));
    if s.undefined_series > 0 {
        output.push_str(&format!(
            "  {} series without a valid run\n",
            s.undefined_series
        ));
    }
    if s.cleanup_failures > 0 {
        output.push_str(&format!(
            "  {} temporary file(s) could not be removed\n",
            s.cleanup_failures
        ));
    }
    output.push_str(&format!(
        "  {} worker(s), total time {:.2} s\n",
        report.config.workers,
        s.total_duration_ms / 1000.0
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use copybench_report::{
        ReportConfig, ReportMeta, ReportSummary, SCHEMA_VERSION, SeriesMetrics, SystemInfo,
        TrialFailure,
    };

    fn series(buffer_size: usize, program: &str, file: &str) -> SeriesReport {
        SeriesReport {
            id: format!("b{}/{}/{}", buffer_size, program, file),
            buffer_size,
            variant: program.trim_start_matches("./").to_string(),
            program: program.to_string(),
            file: file.to_string(),
            samples: vec![Some(5.0), Some(1.0), Some(2.0), Some(3.0), Some(100.0)],
            failures: Vec::new(),
            metrics: SeriesMetrics {
                valid: 5,
                failed: 0,
                excluded_min: Some(1.0),
                excluded_max: Some(100.0),
                mean: Some(10.0 / 3.0),
                min: Some(2.0),
                max: Some(5.0),
                std_dev: Some(1.247219),
                positive_deviation: Some(5.0 - 10.0 / 3.0),
                negative_deviation: Some(10.0 / 3.0 - 2.0),
            },
        }
    }

    fn report(series: Vec<SeriesReport>) -> Report {
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
                buffers: vec![1, 512],
                variants: vec!["unixcopy".to_string()],
                files: vec!["a.bin".to_string()],
                trials: 5,
                tmp_dir: "/tmp".to_string(),
                workers: 4,
                trial_timeout_ms: None,
            },
            summary: ReportSummary {
                total_series: series.len(),
                total_trials: series.len() * 5,
                succeeded: series.len() * 5,
                ..Default::default()
            },
            series,
        }
    }

    #[test]
    fn test_groups_follow_matrix_order() {
        let output = format_human_output(&report(vec![
            series(1, "./unixcopy", "a.bin"),
            series(1, "./unixcopy", "b.bin"),
            series(512, "./unixcopy", "a.bin"),
        ]));

        assert_eq!(output.matches("Buffer size:").count(), 2);
        assert_eq!(output.matches("Program: ./unixcopy").count(), 2);
        let first = output.find("Buffer size: 1 bytes").unwrap();
        let second = output.find("Buffer size: 512 bytes").unwrap();
        assert!(first < second);
        assert!(output.find("File: b.bin").unwrap() < second);
    }

    #[test]
    fn test_variants_sharing_a_program_get_own_groups() {
        let mut stdlib = series(1, "./unixcopy", "a.bin");
        stdlib.variant = "unixcopy-stdlib".to_string();
        let output = format_human_output(&report(vec![series(1, "./unixcopy", "a.bin"), stdlib]));

        assert!(output.contains("Program: ./unixcopy (unixcopy)\n"));
        assert!(output.contains("Program: ./unixcopy (unixcopy-stdlib)\n"));
        assert_eq!(output.matches("File: a.bin").count(), 2);
    }

    #[test]
    fn test_series_lines() {
        let output = format_human_output(&report(vec![series(1, "./unixcopy", "a.bin")]));

        assert!(output.contains("runs: [5.000000, 1.000000, 2.000000, 3.000000, 100.000000]"));
        assert!(output.contains("excluded: min 1.000000 s, max 100.000000 s"));
        assert!(output.contains("mean: 3.333333 s over 3 run(s) (5/5 valid)"));
        assert!(output.contains("+dev: 1.666667 s (max 5.000000 - mean 3.333333)"));
        assert!(output.contains("-dev: 1.333333 s (mean 3.333333 - min 2.000000)"));
        assert!(output.contains("1 series, 5 trials: 5 succeeded, 0 failed"));
    }

    #[test]
    fn test_failed_runs_render_nan() {
        let mut s = series(512, "cp", "a.bin");
        s.samples = vec![None, None];
        s.failures = vec![
            TrialFailure {
                trial: 0,
                reason: "exited with status 1".to_string(),
            },
            TrialFailure {
                trial: 1,
                reason: "timed out".to_string(),
            },
        ];
        s.metrics = SeriesMetrics {
            failed: 2,
            ..Default::default()
        };

        let output = format_human_output(&report(vec![s]));

        assert!(output.contains("runs: [nan, nan]"));
        assert!(output.contains("excluded: none"));
        assert!(output.contains("mean: nan (0/2 valid)"));
        assert!(output.contains("+dev: nan"));
        assert!(output.contains("failed: run 1 timed out"));
    }
}
