//! CSV Output
//!
//! One row per series with the trimmed statistics in seconds. Undefined
//! values are left empty.

use crate::report::Report;

const HEADER: &str = "buffer_size,variant,program,file,trials,valid,failed,excluded_min,excluded_max,mean,min,max,positive_deviation,negative_deviation,std_dev";

/// Generate a CSV report
pub fn generate_csv_report(report: &Report) -> String {
    let mut output = String::from(HEADER);
    output.push('\n');

    for series in &report.series {
        let m = &series.metrics;
        let fields = [
            series.buffer_size.to_string(),
            escape(&series.variant),
            escape(&series.program),
            escape(&series.file),
            series.samples.len().to_string(),
            m.valid.to_string(),
            m.failed.to_string(),
            value(m.excluded_min),
            value(m.excluded_max),
            value(m.mean),
            value(m.min),
            value(m.max),
            value(m.positive_deviation),
            value(m.negative_deviation),
            value(m.std_dev),
        ];
        output.push_str(&fields.join(","));
        output.push('\n');
    }

    output
}

fn value(v: Option<f64>) -> String {
    v.map(|v| format!("{:.9}", v)).unwrap_or_default()
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
