//! CLI for k6report.
//!
//! Summarizes the newline-delimited JSON that `k6 run --out json=<file>`
//! writes, and benchmarks the aggregation path.

mod render;

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use k6report::error::{OutputError, ReportError};
use k6report::{Aggregator, aggregate, source};
use serde_json::Value;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Input path meaning "read standard input".
const STDIN: &str = "-";

/// k6report — Summarize k6 JSON output.
#[derive(Parser)]
#[command(name = "k6report", version, about)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Aggregate a k6 JSON log and render a summary report.
    Summarize {
        /// Path to the k6 JSON output, or "-" for stdin.
        #[arg(default_value = "results.json")]
        input: PathBuf,

        /// Write the report to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report format.
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Run an aggregation throughput microbenchmark.
    Bench {
        /// Number of simulated requests to generate.
        #[arg(long, default_value = "1000000")]
        requests: u64,

        /// Number of distinct check names.
        #[arg(long, default_value = "2")]
        checks: u32,
    },
}

/// Output format for the rendered report.
#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Plain-text report.
    Text,
    /// Summary as pretty-printed JSON.
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Summarize {
            input,
            output,
            format,
        } => cmd_summarize(&input, output.as_deref(), &format),
        Commands::Bench { requests, checks } => cmd_bench(requests, checks),
    };

    if let Err(e) = result {
        error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .init();
}

/// Implements `k6report summarize [input]`.
fn cmd_summarize(
    input: &Path,
    output: Option<&Path>,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let records = open_input(input)?;

    let started = Instant::now();
    let summary = aggregate::try_run(records)?;
    debug!(
        elapsed = ?started.elapsed(),
        samples = summary.duration().count,
        checks = summary.checks().len(),
        "aggregated {}",
        input.display()
    );

    let report = match format {
        OutputFormat::Text => render::text(&summary)?,
        OutputFormat::Json => render::json(&summary)?,
    };

    match output {
        Some(path) => {
            write_report(path, &report)?;
            info!("Generated report: {}", path.display());
        }
        None => print!("{report}"),
    }

    Ok(())
}

/// Records pulled from the input, one line at a time.
type Records = Box<dyn Iterator<Item = k6report::Result<Value>>>;

/// Opens the input, turning a missing file into the hint k6 users need.
fn open_input(input: &Path) -> Result<Records, Box<dyn std::error::Error>> {
    if input.as_os_str() == STDIN {
        return Ok(Box::new(source::from_reader(std::io::stdin().lock())));
    }

    match source::open(input) {
        Ok(records) => Ok(Box::new(records)),
        Err(ReportError::Source(e)) if e.is_not_found() => Err(format!(
            "{path} not found; run k6 with --out json={path} first",
            path = input.display()
        )
        .into()),
        Err(e) => Err(e.into()),
    }
}

fn write_report(path: &Path, report: &str) -> Result<(), ReportError> {
    std::fs::write(path, report).map_err(|e| OutputError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Implements `k6report bench`.
#[allow(clippy::cast_precision_loss)] // Benchmark stats are fine with f64 precision
fn cmd_bench(requests: u64, checks: u32) -> Result<(), Box<dyn std::error::Error>> {
    println!("k6report aggregation benchmark");
    println!("  Requests: {requests}");
    println!("  Checks:   {checks}");
    println!();

    let log = synthetic_log(requests, checks);
    println!("Aggregating {} bytes of synthetic k6 output...", log.len());

    let start = Instant::now();
    let mut records = source::from_reader(Cursor::new(log.as_slice()));
    let mut aggregator = Aggregator::new();
    for record in records.by_ref() {
        aggregator.observe(&record?);
    }
    let summary = aggregator.finish();
    let elapsed = start.elapsed();
    let lines = records.lines_read();
    debug!(samples = summary.duration().count, "benchmark run finished");

    let ns_per_line = elapsed.as_nanos() as f64 / lines.max(1) as f64;
    let lines_per_sec = lines as f64 / elapsed.as_secs_f64();
    let mb_per_sec = log.len() as f64 / 1_048_576.0 / elapsed.as_secs_f64();

    println!();
    println!("Results:");
    println!("  Lines: {lines}");
    println!("  Elapsed: {elapsed:.3?}");
    println!("  Avg latency: {ns_per_line:.1} ns/line");
    println!("  Throughput: {lines_per_sec:.0} lines/sec ({mb_per_sec:.1} MB/s)");
    println!();

    Ok(())
}

/// Generates k6-shaped output: per request one `http_reqs`,
/// `http_req_duration` and `http_req_failed` Point plus one Point per check.
fn synthetic_log(requests: u64, checks: u32) -> Vec<u8> {
    let mut out = String::new();
    let mut vus = 0u64;

    for i in 0..requests {
        if i % 1000 == 0 {
            vus = (vus + 5).min(200);
            out.push_str(&format!(
                "{{\"metric\":\"vus_max\",\"type\":\"Point\",\"data\":{{\"value\":{vus}}}}}\n"
            ));
        }
        let latency = 40 + (i * 7919) % 500;
        let failed = u8::from(i % 53 == 0);
        out.push_str(&format!(
            "{{\"metric\":\"http_reqs\",\"type\":\"Point\",\"data\":{{\"value\":1}}}}\n\
             {{\"metric\":\"http_req_duration\",\"type\":\"Point\",\"data\":{{\"value\":{latency}.25}}}}\n\
             {{\"metric\":\"http_req_failed\",\"type\":\"Point\",\"data\":{{\"value\":{failed}}}}}\n"
        ));
        for c in 0..checks {
            let passed = if c == 0 { 1 - failed } else { 1 };
            out.push_str(&format!(
                "{{\"metric\":\"checks\",\"type\":\"Point\",\"data\":{{\"value\":{passed},\"tags\":{{\"check\":\"check {c}\"}}}}}}\n"
            ));
        }
    }

    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_log_aggregates() {
        let log = synthetic_log(106, 2);
        let summary = aggregate::try_run(source::from_reader(Cursor::new(log))).unwrap();

        assert_eq!(summary.total_http_reqs(), 106.0);
        assert_eq!(summary.failed_http_reqs(), 2.0);
        assert_eq!(summary.duration().count, 106);
        assert_eq!(summary.vus_max(), 5.0);
        assert_eq!(summary.checks().len(), 2);
        assert_eq!(summary.checks()["check 0"].passed, 104.0);
        assert!(summary.checks()["check 1"].all_passed());
    }

    #[test]
    fn test_missing_input_hint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");

        let err = open_input(&path).err().unwrap().to_string();
        assert!(err.contains("not found"), "{err}");
        assert!(err.contains("--out json="), "{err}");
    }

    #[test]
    fn test_summarize_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("results.json");
        let output = dir.path().join("report.json");
        std::fs::write(&input, synthetic_log(10, 1)).unwrap();

        cmd_summarize(&input, Some(&output), &OutputFormat::Json).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["totalHttpReqs"], 10.0);
        assert_eq!(written["durationStats"]["count"], 10);
    }
}
