//! Classification of decoded k6 records into metric events.
//!
//! k6's JSON output mixes metric declarations (`"type": "Metric"`) with
//! observations (`"type": "Point"`). Only Points of five metrics matter here:
//!
//! | metric              | k6 type | [`Event`]                |
//! |---------------------|---------|--------------------------|
//! | `http_reqs`         | counter | [`Event::Counter`]       |
//! | `http_req_failed`   | rate    | [`Event::Rate`]          |
//! | `http_req_duration` | trend   | [`Event::Distribution`]  |
//! | `vus_max`           | gauge   | [`Event::Gauge`]         |
//! | `checks`            | rate    | [`Event::Check`]         |
//!
//! Everything else, including Points with a missing or non-numeric value,
//! classifies as [`Event::Ignore`]. Classification never fails.

use serde_json::Value;

/// Record `type` carried by every observation.
const POINT: &str = "Point";

/// Counter metrics (summed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// `http_reqs`: requests issued.
    HttpReqs,
}

/// Rate metrics (per-observation 0/1 values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rate {
    /// `http_req_failed`: 1 if the request failed, 0 otherwise.
    HttpReqFailed,
}

/// Trend metrics (distribution samples).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    /// `http_req_duration`: request latency in milliseconds.
    HttpReqDuration,
}

/// Gauge metrics (instantaneous values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gauge {
    /// `vus_max`: number of VUs allocated.
    VusMax,
}

impl Counter {
    /// Returns the k6 metric name.
    pub fn name(self) -> &'static str {
        match self {
            Self::HttpReqs => "http_reqs",
        }
    }
}

impl Rate {
    /// Returns the k6 metric name.
    pub fn name(self) -> &'static str {
        match self {
            Self::HttpReqFailed => "http_req_failed",
        }
    }
}

impl Trend {
    /// Returns the k6 metric name.
    pub fn name(self) -> &'static str {
        match self {
            Self::HttpReqDuration => "http_req_duration",
        }
    }
}

impl Gauge {
    /// Returns the k6 metric name.
    pub fn name(self) -> &'static str {
        match self {
            Self::VusMax => "vus_max",
        }
    }
}

/// Name of the metric k6 emits for `check()` results.
pub const CHECKS: &str = "checks";

/// One classified record.
///
/// Borrows the check name from the record it was classified from, so
/// classification itself never allocates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event<'a> {
    /// A counter increment.
    Counter(Counter, f64),
    /// A rate observation.
    Rate(Rate, f64),
    /// A distribution sample.
    Distribution(Trend, f64),
    /// A gauge reading.
    Gauge(Gauge, f64),
    /// One evaluation of a named check.
    Check {
        /// The check name (`data.tags.check`).
        name: &'a str,
        /// Contribution to the passed tally; see [`check_passed`].
        passed: f64,
    },
    /// Not a recognized shape.
    Ignore,
}

/// Classifies one decoded record.
///
/// A record is recognized when it is an object with `"type": "Point"`, a
/// known `metric`, and:
///
/// - for numeric metrics, a JSON number at `data.value`;
/// - for `checks`, a non-empty string at `data.tags.check` (the value may be
///   absent).
///
/// # Examples
///
/// ```rust
/// use k6report::classify::{classify, Counter, Event};
/// use serde_json::json;
///
/// let record = json!({"metric": "http_reqs", "type": "Point", "data": {"value": 1}});
/// assert_eq!(classify(&record), Event::Counter(Counter::HttpReqs, 1.0));
///
/// let record = json!({"metric": "http_reqs", "type": "Point", "data": {}});
/// assert_eq!(classify(&record), Event::Ignore);
/// ```
pub fn classify(record: &Value) -> Event<'_> {
    if record.get("type").and_then(Value::as_str) != Some(POINT) {
        return Event::Ignore;
    }
    let Some(metric) = record.get("metric").and_then(Value::as_str) else {
        return Event::Ignore;
    };
    let data = record.get("data");

    if metric == CHECKS {
        let name = data
            .and_then(|d| d.get("tags"))
            .and_then(|t| t.get("check"))
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty());
        return match name {
            Some(name) => Event::Check {
                name,
                passed: check_passed(data.and_then(|d| d.get("value"))),
            },
            None => Event::Ignore,
        };
    }

    let Some(value) = data.and_then(|d| d.get("value")).and_then(Value::as_f64) else {
        return Event::Ignore;
    };

    match metric {
        "http_reqs" => Event::Counter(Counter::HttpReqs, value),
        "http_req_failed" => Event::Rate(Rate::HttpReqFailed, value),
        "http_req_duration" => Event::Distribution(Trend::HttpReqDuration, value),
        "vus_max" => Event::Gauge(Gauge::VusMax, value),
        _ => Event::Ignore,
    }
}

/// Maps a check Point's `data.value` to its contribution to the passed tally.
///
/// `true` counts as 1 and numbers are added as-is; `false`, `null`, absent,
/// and any non-numeric value count as 0.
pub fn check_passed(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Bool(true)) => 1.0,
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        _ => 0.0,
    }
}
