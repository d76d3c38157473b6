//! Finalized run summary.
//!
//! A [`Summary`] is produced once by [`Aggregator::finish`] after the input
//! is drained and is never mutated afterward. Renderers read it through
//! accessors; the derived percentages here already resolve empty
//! denominators, so no NaN ever reaches a rendering.
//!
//! [`Aggregator::finish`]: crate::aggregate::Aggregator::finish

use std::fmt;
use std::ops::Index;

use serde::{Serialize, Serializer};

/// Text shown for a statistic with no samples behind it.
pub const NOT_AVAILABLE: &str = "n/a";

/// A latency statistic that may have no data behind it.
///
/// `NotAvailable` is distinct from a zero latency. Both [`fmt::Display`] and
/// serialization render the value with exactly two decimals, or `"n/a"`.
/// A value lying exactly halfway between two hundredths rounds away from
/// zero (`0.125` renders as `"0.13"`), matching JavaScript's `toFixed(2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stat {
    /// No samples were observed.
    NotAvailable,
    /// Computed value.
    Value(f64),
}

impl Stat {
    /// Returns the numeric value, if any.
    pub fn value(self) -> Option<f64> {
        match self {
            Self::NotAvailable => None,
            Self::Value(v) => Some(v),
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAvailable => f.write_str(NOT_AVAILABLE),
            Self::Value(v) => write!(f, "{:.2}", round_half_away(*v)),
        }
    }
}

/// Nudges exact hundredth ties to the neighbor away from zero.
///
/// `{:.2}` rounds exact ties to even; every other value is returned as-is
/// and formats identically either way.
#[allow(clippy::float_cmp)]
fn round_half_away(v: f64) -> f64 {
    let scaled = v * 100.0;
    // Zero residual means the product above was not rounded.
    let exact = v.mul_add(100.0, -scaled) == 0.0;
    if exact && scaled.fract().abs() == 0.5 {
        (scaled + 0.5_f64.copysign(v)) / 100.0
    } else {
        v
    }
}

impl Serialize for Stat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Distribution statistics over `http_req_duration` samples (milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DurationStats {
    /// Number of samples.
    pub count: usize,
    /// Smallest sample.
    pub min: Stat,
    /// Largest sample.
    pub max: Stat,
    /// Arithmetic mean.
    pub avg: Stat,
}

impl DurationStats {
    /// Computes statistics over the full sample sequence.
    ///
    /// Samples are reduced in the order given, so the same sequence always
    /// yields bit-identical results.
    #[allow(clippy::cast_precision_loss)] // sample counts beyond 2^53 are not a concern
    pub fn from_samples(samples: &[f64]) -> Self {
        let Some((&first, rest)) = samples.split_first() else {
            return Self {
                count: 0,
                min: Stat::NotAvailable,
                max: Stat::NotAvailable,
                avg: Stat::NotAvailable,
            };
        };

        let (min, max, sum) = rest
            .iter()
            .fold((first, first, first), |(min, max, sum), &v| {
                (min.min(v), max.max(v), sum + v)
            });

        Self {
            count: samples.len(),
            min: Stat::Value(min),
            max: Stat::Value(max),
            avg: Stat::Value(sum / samples.len() as f64),
        }
    }
}

/// Tally for one named check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSummary {
    /// Number of evaluations.
    pub total: u64,
    /// Sum of passed contributions.
    pub passed: f64,
    /// `passed / total * 100`, or 0 when `total` is 0.
    pub pass_rate_percent: f64,
}

impl CheckSummary {
    /// Builds a check summary, resolving the pass rate.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(total: u64, passed: f64) -> Self {
        let pass_rate_percent = if total > 0 {
            passed / total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            total,
            passed,
            pass_rate_percent,
        }
    }

    /// Returns `true` if every evaluation passed.
    #[allow(clippy::cast_precision_loss, clippy::float_cmp)]
    pub fn all_passed(&self) -> bool {
        self.passed == self.total as f64
    }
}

/// Per-check tallies in the order each check name was first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Checks {
    entries: Vec<(String, CheckSummary)>,
}

impl Checks {
    /// Number of distinct check names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no check was evaluated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a check by name.
    pub fn get(&self, name: &str) -> Option<&CheckSummary> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, check)| check)
    }

    /// Iterates `(name, summary)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CheckSummary)> {
        self.entries.iter().map(|(n, check)| (n.as_str(), check))
    }
}

impl FromIterator<(String, CheckSummary)> for Checks {
    fn from_iter<I: IntoIterator<Item = (String, CheckSummary)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Index<&str> for Checks {
    type Output = CheckSummary;

    /// # Panics
    ///
    /// Panics if no check named `name` was recorded.
    fn index(&self, name: &str) -> &CheckSummary {
        match self.get(name) {
            Some(check) => check,
            None => panic!("no check named {name:?}"),
        }
    }
}

impl<'a> IntoIterator for &'a Checks {
    type Item = (&'a str, &'a CheckSummary);
    type IntoIter = Box<dyn Iterator<Item = Self::Item> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl Serialize for Checks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// The finalized aggregate of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    total_http_reqs: f64,
    failed_http_reqs: f64,
    #[serde(rename = "durationStats")]
    duration: DurationStats,
    checks: Checks,
    vus_max: f64,
}

impl Summary {
    pub(crate) fn new(
        total_http_reqs: f64,
        failed_http_reqs: f64,
        duration: DurationStats,
        checks: Checks,
        vus_max: f64,
    ) -> Self {
        Self {
            total_http_reqs,
            failed_http_reqs,
            duration,
            checks,
            vus_max,
        }
    }

    /// Sum of `http_reqs` values.
    pub fn total_http_reqs(&self) -> f64 {
        self.total_http_reqs
    }

    /// Sum of `http_req_failed` values.
    ///
    /// This equals the number of failed requests only when every Point
    /// carries 0 or 1, which is what k6 emits.
    pub fn failed_http_reqs(&self) -> f64 {
        self.failed_http_reqs
    }

    /// Latency statistics.
    pub fn duration(&self) -> &DurationStats {
        &self.duration
    }

    /// Per-check tallies, in the order each check was first seen.
    pub fn checks(&self) -> &Checks {
        &self.checks
    }

    /// Highest `vus_max` reading, or 0 if none was seen.
    pub fn vus_max(&self) -> f64 {
        self.vus_max
    }

    /// Failed requests as a percentage of all requests.
    ///
    /// With no traffic observed this is 0, never NaN.
    pub fn failure_rate_percent(&self) -> f64 {
        if self.total_http_reqs == 0.0 {
            0.0
        } else {
            self.failed_http_reqs / self.total_http_reqs * 100.0
        }
    }

    /// `100 - failure_rate_percent()`; 100 with no traffic observed.
    pub fn success_rate_percent(&self) -> f64 {
        100.0 - self.failure_rate_percent()
    }
}
