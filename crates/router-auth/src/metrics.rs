//! Auth flow counters
//!
//! - `auth_login_redirects_total` (counter): label `provider`
//! - `auth_callbacks_total` (counter): labels `provider`, `outcome`
//! - `auth_selection_failures_total` (counter): label `reason`
//!
//! Without an installed recorder these are no-ops.

/// Record a login redirect issued for `provider`.
pub fn record_login_redirect(provider: &str) {
    metrics::counter!("auth_login_redirects_total", "provider" => provider.to_string())
        .increment(1);
}

/// Record a finished callback. `outcome` is `success` or the failing step.
pub fn record_callback(provider: &str, outcome: &'static str) {
    metrics::counter!(
        "auth_callbacks_total",
        "provider" => provider.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a request whose provider could not be selected.
pub fn record_selection_failure(reason: &'static str) {
    metrics::counter!("auth_selection_failures_total", "reason" => reason).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        record_login_redirect("github");
        record_callback("github", "success");
        record_selection_failure("unsupported");
    }

    #[test]
    fn counters_render_with_labels() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let _guard = metrics::set_default_local_recorder(&recorder);

        record_login_redirect("github");
        record_callback("google", "success");
        record_callback("google", "exchange");
        record_selection_failure("unsupported");

        let output = handle.render();
        assert!(output.contains("auth_login_redirects_total{provider=\"github\"} 1"));
        assert!(output.contains("outcome=\"success\""));
        assert!(output.contains("outcome=\"exchange\""));
        assert!(output.contains("auth_selection_failures_total{reason=\"unsupported\"} 1"));
    }
}
