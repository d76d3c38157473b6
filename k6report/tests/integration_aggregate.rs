//! Integration tests for aggregating k6 JSON output from disk.

use std::io::{Cursor, Write};

use k6report::aggregate;
use k6report::error::{ReportError, SourceError};
use k6report::source;
use serde_json::{Value, json};
use tempfile::tempdir;

/// A slice of real k6 `--out json` output for a 2-request run.
const K6_OUTPUT: &str = r#"{"type":"Metric","data":{"name":"http_reqs","type":"counter","contains":"default","thresholds":[],"submetrics":null},"metric":"http_reqs"}
{"metric":"vus_max","type":"Point","data":{"time":"2024-05-01T10:00:00.000Z","value":50,"tags":null}}
{"metric":"http_reqs","type":"Point","data":{"time":"2024-05-01T10:00:01.100Z","value":1,"tags":{"method":"POST","status":"200"}}}
{"metric":"http_req_duration","type":"Point","data":{"time":"2024-05-01T10:00:01.100Z","value":100,"tags":{"method":"POST","status":"200"}}}
{"metric":"http_req_failed","type":"Point","data":{"time":"2024-05-01T10:00:01.100Z","value":0,"tags":{"method":"POST","status":"200"}}}
{"metric":"checks","type":"Point","data":{"time":"2024-05-01T10:00:01.101Z","value":1,"tags":{"check":"status is 200"}}}
{"metric":"checks","type":"Point","data":{"time":"2024-05-01T10:00:01.101Z","value":0,"tags":{"check":"response has token"}}}

{"metric":"http_reqs","type":"Point","data":{"time":"2024-05-01T10:00:02.300Z","value":1,"tags":{"method":"POST","status":"500"}}}
{"metric":"http_req_duration","type":"Point","data":{"time":"2024-05-01T10:00:02.300Z","value":300,"tags":{"method":"POST","status":"500"}}}
{"metric":"http_req_failed","type":"Point","data":{"time":"2024-05-01T10:00:02.300Z","value":1,"tags":{"method":"POST","status":"500"}}}
{"metric":"checks","type":"Point","data":{"time":"2024-05-01T10:00:02.301Z","value":0,"tags":{"check":"status is 200"}}}
{"metric":"checks","type":"Point","data":{"time":"2024-05-01T10:00:02.301Z","value":0,"tags":{"check":"response has token"}}}
{"metric":"vus_max","type":"Point","data":{"time":"2024-05-01T10:00:03.000Z","value":30,"tags":null}}
"#;

fn to_lines(records: &[Value]) -> String {
    records.iter().map(|r| format!("{r}\n")).collect()
}

fn summarize(input: &str) -> k6report::Summary {
    aggregate::try_run(source::from_reader(Cursor::new(input.as_bytes().to_vec()))).unwrap()
}

#[test]
fn test_summarize_k6_output_file() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("results.json");
    std::fs::write(&path, K6_OUTPUT).unwrap();

    let summary = aggregate::try_run(source::open(&path).unwrap()).unwrap();

    assert_eq!(summary.total_http_reqs(), 2.0);
    assert_eq!(summary.failed_http_reqs(), 1.0);
    assert_eq!(summary.failure_rate_percent(), 50.0);
    assert_eq!(summary.vus_max(), 50.0);

    let duration = summary.duration();
    assert_eq!(duration.count, 2);
    assert_eq!(duration.min.to_string(), "100.00");
    assert_eq!(duration.max.to_string(), "300.00");
    assert_eq!(duration.avg.to_string(), "200.00");

    let status = summary.checks()["status is 200"];
    assert_eq!(status.total, 2);
    assert_eq!(status.passed, 1.0);
    assert_eq!(status.pass_rate_percent, 50.0);

    let token = summary.checks()["response has token"];
    assert_eq!(token.total, 2);
    assert_eq!(token.pass_rate_percent, 0.0);
}

#[test]
fn test_missing_input_is_reported() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("results.json");

    let err = source::open(&path).unwrap_err();
    assert!(matches!(
        err,
        ReportError::Source(SourceError::Unavailable { .. })
    ));
}

#[test]
fn test_empty_file() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("results.json");
    std::fs::File::create(&path).unwrap().flush().unwrap();

    let summary = aggregate::try_run(source::open(&path).unwrap()).unwrap();
    assert_eq!(summary.total_http_reqs(), 0.0);
    assert_eq!(summary.failed_http_reqs(), 0.0);
    assert_eq!(summary.duration().count, 0);
    assert_eq!(summary.duration().avg.to_string(), "n/a");
    assert!(summary.checks().is_empty());
    assert_eq!(summary.vus_max(), 0.0);
    assert_eq!(summary.success_rate_percent(), 100.0);
}

#[test]
fn test_rerun_is_identical() {
    let first = summarize(K6_OUTPUT);
    let second = summarize(K6_OUTPUT);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_garbage_lines_change_nothing() {
    let mut noisy = String::from("{not json at all}\n{\"metric\":\"unknown\"}\n");
    noisy.push_str("{\"metric\":\"http_reqs\",\"type\":\"Point\",\"data\":{}}\n");
    noisy.push_str(K6_OUTPUT);
    noisy.push_str("\n\n]]]\n");

    assert_eq!(summarize(&noisy), summarize(K6_OUTPUT));
}

#[test]
fn test_duration_count_matches_numeric_duration_points() {
    let records = vec![
        json!({"metric": "http_req_duration", "type": "Point", "data": {"value": 12.5}}),
        json!({"metric": "http_req_duration", "type": "Point", "data": {"value": null}}),
        json!({"metric": "http_req_duration", "type": "Metric", "data": {"value": 1}}),
        json!({"metric": "http_req_duration", "type": "Point", "data": {"value": 0}}),
        json!({"metric": "http_req_waiting", "type": "Point", "data": {"value": 3}}),
    ];
    let summary = summarize(&to_lines(&records));
    assert_eq!(summary.duration().count, 2);
    assert_eq!(summary.duration().min.to_string(), "0.00");
    assert_eq!(summary.duration().max.to_string(), "12.50");
}

#[test]
fn test_permuted_input_gives_same_totals_and_latency() {
    let values = [120.0, 80.0, 310.5, 99.25, 42.0];
    let forward: Vec<Value> = values
        .iter()
        .flat_map(|v| {
            [
                json!({"metric": "http_reqs", "type": "Point", "data": {"value": 1}}),
                json!({"metric": "http_req_duration", "type": "Point", "data": {"value": v}}),
            ]
        })
        .collect();
    let mut reversed = forward.clone();
    reversed.reverse();

    let a = summarize(&to_lines(&forward));
    let b = summarize(&to_lines(&reversed));

    assert_eq!(a.total_http_reqs(), b.total_http_reqs());
    assert_eq!(a.duration().min, b.duration().min);
    assert_eq!(a.duration().max, b.duration().max);
    assert_eq!(a.duration().avg.to_string(), b.duration().avg.to_string());
}

#[test]
fn test_summary_json_shape() {
    let summary = summarize(K6_OUTPUT);
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(
        json,
        json!({
            "totalHttpReqs": 2.0,
            "failedHttpReqs": 1.0,
            "durationStats": {"count": 2, "min": "100.00", "max": "300.00", "avg": "200.00"},
            "checks": {
                "response has token": {"total": 2, "passed": 0.0, "passRatePercent": 0.0},
                "status is 200": {"total": 2, "passed": 1.0, "passRatePercent": 50.0},
            },
            "vusMax": 50.0,
        })
    );
}
