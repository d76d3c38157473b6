//! # k6report
//!
//! Streaming aggregation of k6 JSON output into a run summary.
//!
//! k6 run with `--out json=results.json` writes one JSON object per line:
//! metric declarations, and one `Point` per observation. This crate folds
//! that stream into a small, immutable [`Summary`] (request totals, failure
//! count, latency min/max/avg, per-check pass rates, peak VUs) without
//! holding the log in memory. Only the `http_req_duration` samples are
//! retained, since min/max/avg are computed over the full set.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use k6report::{aggregate, source};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let records = source::open("results.json")?;
//! let summary = aggregate::try_run(records)?;
//!
//! println!("requests: {}", summary.total_http_reqs());
//! println!("avg latency: {} ms", summary.duration().avg);
//! for (name, check) in summary.checks() {
//!     println!("{name}: {:.2}%", check.pass_rate_percent);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`classify`] — Maps one decoded record to a closed set of [`Event`]s
//! - [`Aggregator`] — Owns the running state and folds events into it
//! - [`Summary`] — Finalized, immutable result handed to a renderer
//! - [`RecordReader`] — Lazy line-by-line decoder over any `BufRead`
//!
//! ## Modules
//!
//! - [`classify`] — Event classification
//! - [`aggregate`] — Accumulator state and folding rules
//! - [`summary`] — Summary types and derived statistics
//! - [`source`] — Record sources (files, stdin, in-memory buffers)
//! - [`error`] — Error types

pub mod aggregate;
pub mod classify;
pub mod error;
pub mod source;
pub mod summary;

// Re-export primary API types at crate root for convenience.
pub use aggregate::Aggregator;
pub use classify::{Counter, Event, Gauge, Rate, Trend, classify};
pub use error::{ReportError, Result};
pub use source::RecordReader;
pub use summary::{CheckSummary, Checks, DurationStats, Stat, Summary};
