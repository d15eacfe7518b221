//! Prometheus metrics exposition
//!
//! Serves the adapter's `auth_*` counters plus the demo's own:
//!
//! - `http_requests_total` (counter): labels `status`, `method`
//! - `http_request_duration_seconds` (histogram): label `status`

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

const DURATION_METRIC: &str = "http_request_duration_seconds";

/// Bucket boundaries from 5ms to 30s; the slow end covers a provider round trip.
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

fn builder() -> anyhow::Result<PrometheusBuilder> {
    Ok(PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(DURATION_METRIC.to_string()), DURATION_BUCKETS)?)
}

/// Install the Prometheus recorder and return a handle for rendering metrics.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    Ok(builder()?.install_recorder()?)
}

/// Recorder that is not installed globally, for tests.
#[cfg(test)]
pub fn build_recorder() -> anyhow::Result<metrics_exporter_prometheus::PrometheusRecorder> {
    Ok(builder()?.build_recorder())
}

/// Record a completed request with status code and HTTP method labels.
pub fn record_request(status: u16, method: &str, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!("http_requests_total", "status" => status_str.clone(), "method" => method.to_string())
        .increment(1);
    metrics::histogram!(DURATION_METRIC, "status" => status_str).record(duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_request_does_not_panic_without_recorder() {
        record_request(200, "GET", 0.05);
    }

    #[test]
    fn record_request_increments_counter_and_histogram() {
        let recorder = build_recorder().unwrap();
        let handle = recorder.handle();
        let _guard = metrics::set_default_local_recorder(&recorder);

        record_request(302, "GET", 0.004);
        record_request(500, "GET", 1.2);

        let output = handle.render();
        assert!(output.contains("http_requests_total"));
        assert!(output.contains("status=\"302\""));
        assert!(output.contains("status=\"500\""));
        assert!(
            output.contains("http_request_duration_seconds_bucket"),
            "histogram must render _bucket lines for histogram_quantile() queries"
        );
        assert!(output.contains("le=\"30\""));
    }
}
