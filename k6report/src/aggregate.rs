//! Streaming aggregation of k6 records into a [`Summary`].
//!
//! The [`Aggregator`] owns all running state for one run. Records are folded
//! strictly in arrival order, one at a time; nothing but the latency samples
//! outlives the record it came from.
//!
//! # Folding rules
//!
//! | Event                          | Effect                                   |
//! |--------------------------------|------------------------------------------|
//! | `Counter(HttpReqs, v)`         | `total_requests += v`                    |
//! | `Rate(HttpReqFailed, v)`       | `failed_requests += v`                   |
//! | `Distribution(HttpReqDuration, v)` | append `v` to the duration samples   |
//! | `Gauge(VusMax, v)`             | `vus_max = max(vus_max, v)`              |
//! | `Check { name, passed }`       | `checks[name].total += 1`, `.passed += passed` |
//! | `Ignore`                       | nothing                                  |
//!
//! Values are taken as-is: negative counts or `http_req_failed` values other
//! than 0/1 are summed without validation.

use std::collections::HashMap;

use serde_json::Value;

use crate::classify::{Counter, Event, Gauge, Rate, Trend, classify};
use crate::error::Result;
use crate::summary::{CheckSummary, DurationStats, Summary};

/// Running tally for one named check.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct CheckTally {
    total: u64,
    passed: f64,
}

impl CheckTally {
    fn record(&mut self, passed: f64) {
        self.total += 1;
        self.passed += passed;
    }
}

/// Accumulator state for one aggregation run.
///
/// Consumed by [`finish`](Self::finish), so a run is finalized exactly once
/// and a [`Summary`] can never observe later records.
#[derive(Debug, Default)]
pub struct Aggregator {
    total_requests: f64,
    failed_requests: f64,
    /// Arrival order is kept for future order-sensitive statistics.
    duration_samples: Vec<f64>,
    /// Tallies in first-seen order, indexed by `check_index`.
    check_stats: Vec<(String, CheckTally)>,
    check_index: HashMap<String, usize>,
    vus_max: f64,
}

impl Aggregator {
    /// Creates an aggregator with all accumulators at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies one decoded record and folds it in.
    pub fn observe(&mut self, record: &Value) {
        self.fold(classify(record));
    }

    /// Folds one classified event into the running state.
    pub fn fold(&mut self, event: Event<'_>) {
        match event {
            Event::Counter(Counter::HttpReqs, value) => self.total_requests += value,
            Event::Rate(Rate::HttpReqFailed, value) => self.failed_requests += value,
            Event::Distribution(Trend::HttpReqDuration, value) => {
                self.duration_samples.push(value);
            }
            Event::Gauge(Gauge::VusMax, value) => self.vus_max = self.vus_max.max(value),
            Event::Check { name, passed } => {
                // Only the first sighting of a name allocates.
                if let Some(&slot) = self.check_index.get(name) {
                    self.check_stats[slot].1.record(passed);
                } else {
                    let mut tally = CheckTally::default();
                    tally.record(passed);
                    self.check_index.insert(name.to_owned(), self.check_stats.len());
                    self.check_stats.push((name.to_owned(), tally));
                }
            }
            Event::Ignore => {}
        }
    }

    /// Number of latency samples retained so far.
    pub fn sample_count(&self) -> usize {
        self.duration_samples.len()
    }

    /// Finalizes the run into an immutable [`Summary`].
    pub fn finish(self) -> Summary {
        let duration = DurationStats::from_samples(&self.duration_samples);
        let checks = self
            .check_stats
            .into_iter()
            .map(|(name, tally)| (name, CheckSummary::new(tally.total, tally.passed)))
            .collect();

        Summary::new(
            self.total_requests,
            self.failed_requests,
            duration,
            checks,
            self.vus_max,
        )
    }
}

/// Aggregates an already-decoded sequence of records.
///
/// # Examples
///
/// ```rust
/// use k6report::aggregate;
/// use serde_json::json;
///
/// let records = [100, 200, 300].map(|v| {
///     json!({"metric": "http_req_duration", "type": "Point", "data": {"value": v}})
/// });
/// let summary = aggregate::run(records);
/// assert_eq!(summary.duration().count, 3);
/// assert_eq!(summary.duration().avg.to_string(), "200.00");
/// ```
pub fn run<I>(records: I) -> Summary
where
    I: IntoIterator<Item = Value>,
{
    let mut aggregator = Aggregator::new();
    for record in records {
        aggregator.observe(&record);
    }
    aggregator.finish()
}

/// Drains a fallible record source, such as a [`RecordReader`], and
/// aggregates it.
///
/// [`RecordReader`]: crate::source::RecordReader
///
/// # Errors
///
/// Returns the first error raised by the source. No summary is produced for
/// a run that did not reach the end of its input.
pub fn try_run<I>(records: I) -> Result<Summary>
where
    I: IntoIterator<Item = Result<Value>>,
{
    let mut aggregator = Aggregator::new();
    for record in records {
        aggregator.observe(&record?);
    }
    Ok(aggregator.finish())
}
