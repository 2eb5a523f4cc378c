//! JSON Output

use crate::report::Report;

/// Current report schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Generate a prettified JSON report.
///
/// Failed trials and undefined statistics serialize as `null`.
pub fn generate_json_report(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
