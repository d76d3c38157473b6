//! Human-readable and JSON renderings of a [`Summary`].
//!
//! The summary is final; nothing here aggregates. Check names come straight
//! from the load test script, so they are escaped before being embedded.

use std::fmt::{self, Write as _};

use k6report::error::{OutputError, Result};
use k6report::{CheckSummary, Summary};

/// Renders the summary as pretty-printed JSON.
pub fn json(summary: &Summary) -> Result<String> {
    let mut out = serde_json::to_string_pretty(summary)
        .map_err(|e| OutputError::Serialize { source: e })?;
    out.push('\n');
    Ok(out)
}

/// Renders the summary as a plain-text report.
///
/// # Errors
///
/// Returns an error only if a value's `Display` implementation fails.
pub fn text(summary: &Summary) -> std::result::Result<String, fmt::Error> {
    let duration = summary.duration();
    let mut out = String::new();

    writeln!(out, "k6 Performance Test Report")?;
    writeln!(out)?;
    writeln!(out, "Summary")?;
    writeln!(out, "  Total requests:       {}", summary.total_http_reqs())?;
    writeln!(
        out,
        "  Failed requests:      {} ({:.2}% failed, {:.2}% succeeded)",
        summary.failed_http_reqs(),
        summary.failure_rate_percent(),
        summary.success_rate_percent(),
    )?;
    writeln!(out, "  Virtual users (max):  {}", summary.vus_max())?;
    writeln!(out, "  Avg response time:    {} ms", duration.avg)?;
    writeln!(out)?;
    writeln!(out, "Response time")?;
    writeln!(out, "  Minimum:       {} ms", duration.min)?;
    writeln!(out, "  Maximum:       {} ms", duration.max)?;
    writeln!(out, "  Average:       {} ms", duration.avg)?;
    writeln!(out, "  Sample count:  {}", duration.count)?;
    writeln!(out)?;
    writeln!(out, "Checks")?;

    if summary.checks().is_empty() {
        writeln!(out, "  No checks recorded")?;
        return Ok(out);
    }

    let rows: Vec<(String, &CheckSummary)> = summary
        .checks()
        .iter()
        .map(|(name, check)| (escape(name), check))
        .collect();
    let width = rows
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0)
        .max(10);

    writeln!(
        out,
        "  {:<width$}  {:>8}  {:>8}  {:>8}  STATUS",
        "CHECK", "TOTAL", "PASSED", "RATE"
    )?;
    for (name, check) in &rows {
        let badge = if check.all_passed() { "PASS" } else { "FAIL" };
        writeln!(
            out,
            "  {:<width$}  {:>8}  {:>8}  {:>7.2}%  {badge}",
            name, check.total, check.passed, check.pass_rate_percent
        )?;
    }

    Ok(out)
}

/// Escapes control characters so a check name stays on one line.
fn escape(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_control() {
                c.escape_default().to_string()
            } else {
                c.to_string()
            }
        })
        .collect()
}
