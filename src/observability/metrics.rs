//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define `/hasJoined` metrics
//! - Install the Prometheus recorder when metrics are enabled
//! - Record one observation per handled request
//!
//! # Metrics
//! All labelled by `username` and `serverId`:
//! - `ymux_api_request_process_time_seconds` (histogram): time to serve one request
//! - `ymux_api_total_request_count` (counter): requests processed
//! - `ymux_api_success_count` (counter): requests answered without error
//! - `ymux_api_fail_count` (counter): requests that errored
//! - `ymux_api_logged_in_count` (counter): successful requests answered 200
//! - `ymux_api_not_logged_in_count` (counter): successful requests answered 204
//!
//! Plus `ymux_build_info` (gauge, always 1) labelled by crate `version`.
//!
//! # Design Decisions
//! - Without an installed recorder every call here is a no-op
//! - Every family is registered at startup with empty labels so scrapes see
//!   it before the first request
//! - Histogram buckets tuned for upstream round trips with retries

use std::time::Instant;

use metrics::Label;
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

pub const REQUEST_PROCESS_TIME: &str = "ymux_api_request_process_time_seconds";
pub const TOTAL_REQUEST_COUNT: &str = "ymux_api_total_request_count";
pub const SUCCESS_COUNT: &str = "ymux_api_success_count";
pub const FAIL_COUNT: &str = "ymux_api_fail_count";
pub const LOGGED_IN_COUNT: &str = "ymux_api_logged_in_count";
pub const NOT_LOGGED_IN_COUNT: &str = "ymux_api_not_logged_in_count";
pub const BUILD_INFO: &str = "ymux_build_info";

const COUNTERS: [&str; 5] = [
    TOTAL_REQUEST_COUNT,
    SUCCESS_COUNT,
    FAIL_COUNT,
    LOGGED_IN_COUNT,
    NOT_LOGGED_IN_COUNT,
];

const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// How a `/hasJoined` request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Failed,
    LoggedIn,
    NotLoggedIn,
}

/// What the handler learned about one `/hasJoined` request.
#[derive(Debug, Clone)]
pub struct RequestInfo<'a> {
    pub username: &'a str,
    pub server_id: &'a str,
    pub outcome: Outcome,
}

fn builder() -> Result<PrometheusBuilder, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(REQUEST_PROCESS_TIME.to_string()), LATENCY_BUCKETS)
}

/// Install the global recorder and return a handle for rendering `/metrics`.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = builder()?.install_recorder()?;

    metrics::describe_histogram!(REQUEST_PROCESS_TIME, metrics::Unit::Seconds, "time used for serving one /hasJoined request");
    metrics::describe_counter!(TOTAL_REQUEST_COUNT, "requests processed by this process");
    metrics::describe_counter!(SUCCESS_COUNT, "successful requests");
    metrics::describe_counter!(FAIL_COUNT, "errored requests");
    metrics::describe_counter!(LOGGED_IN_COUNT, "requests with 200 (logged in) /hasJoined result");
    metrics::describe_counter!(NOT_LOGGED_IN_COUNT, "requests with 204 (not logged in) /hasJoined result");
    metrics::describe_gauge!(BUILD_INFO, "build information of the running binary");

    register_series();

    tracing::info!("Prometheus metrics exporter enabled");
    Ok(handle)
}

fn empty_labels() -> Vec<Label> {
    vec![Label::new("username", ""), Label::new("serverId", "")]
}

/// Create every series at zero so `/metrics` lists all families up front.
fn register_series() {
    metrics::gauge!(BUILD_INFO, "version" => env!("CARGO_PKG_VERSION")).set(1.0);
    for name in COUNTERS {
        metrics::counter!(name, empty_labels()).absolute(0);
    }
    // Registration alone is enough for the exporter to render the family.
    let _ = metrics::histogram!(REQUEST_PROCESS_TIME, empty_labels());
}

/// Record a handled `/hasJoined` request.
pub fn record_has_joined(info: &RequestInfo<'_>, start_time: Instant) {
    let labels = vec![
        Label::new("username", info.username.to_string()),
        Label::new("serverId", info.server_id.to_string()),
    ];

    metrics::histogram!(REQUEST_PROCESS_TIME, labels.clone()).record(start_time.elapsed().as_secs_f64());
    metrics::counter!(TOTAL_REQUEST_COUNT, labels.clone()).increment(1);
    match info.outcome {
        Outcome::Failed => metrics::counter!(FAIL_COUNT, labels).increment(1),
        Outcome::LoggedIn => {
            metrics::counter!(SUCCESS_COUNT, labels.clone()).increment(1);
            metrics::counter!(LOGGED_IN_COUNT, labels).increment(1);
        }
        Outcome::NotLoggedIn => {
            metrics::counter!(SUCCESS_COUNT, labels.clone()).increment(1);
            metrics::counter!(NOT_LOGGED_IN_COUNT, labels).increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample<'a>(rendered: &'a str, name: &str) -> Option<&'a str> {
        rendered
            .lines()
            .find(|l| {
                l.starts_with(&format!("{name}{{"))
                    && l.contains(r#"username="alice""#)
                    && l.contains(r#"serverId="sid""#)
            })
            .and_then(|l| l.rsplit(' ').next())
    }

    #[test]
    fn test_recorded_request_is_rendered() {
        let recorder = builder().unwrap().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_has_joined(
                &RequestInfo {
                    username: "alice",
                    server_id: "sid",
                    outcome: Outcome::LoggedIn,
                },
                Instant::now(),
            );
            record_has_joined(
                &RequestInfo {
                    username: "alice",
                    server_id: "sid",
                    outcome: Outcome::Failed,
                },
                Instant::now(),
            );
        });

        let rendered = handle.render();
        assert_eq!(sample(&rendered, TOTAL_REQUEST_COUNT), Some("2"));
        assert_eq!(sample(&rendered, SUCCESS_COUNT), Some("1"));
        assert_eq!(sample(&rendered, LOGGED_IN_COUNT), Some("1"));
        assert_eq!(sample(&rendered, FAIL_COUNT), Some("1"));
        assert_eq!(sample(&rendered, NOT_LOGGED_IN_COUNT), None);
        assert!(rendered.contains("ymux_api_request_process_time_seconds_bucket"));
    }

    #[test]
    fn test_families_are_present_before_first_request() {
        let recorder = builder().unwrap().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, register_series);

        let rendered = handle.render();
        for name in COUNTERS {
            let line = rendered
                .lines()
                .find(|l| l.starts_with(&format!("{name}{{")))
                .unwrap_or_else(|| panic!("{name} missing from:\n{rendered}"));
            assert!(line.contains(r#"username="""#), "{line}");
            assert!(line.ends_with(" 0"), "{line}");
        }
        assert!(rendered.contains(&format!(r#"{BUILD_INFO}{{version="{}"}} 1"#, env!("CARGO_PKG_VERSION"))));
        assert!(rendered.contains(REQUEST_PROCESS_TIME));
    }
}
