//! Metrics collection and Prometheus export.
//!
//! Initializes the metrics exporter and provides the /metrics endpoint handler.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub const CHAT_MESSAGES_TOTAL: &str = "chat_messages_total";
pub const CHAT_LEADS_CAPTURED_TOTAL: &str = "chat_leads_captured_total";
pub const MEETING_REQUESTS_TOTAL: &str = "meeting_requests_total";
pub const NOTIFICATIONS_FAILED_TOTAL: &str = "notifications_failed_total";
pub const CONTACT_SUBMISSIONS_TOTAL: &str = "contact_submissions_total";

/// Install the Prometheus recorder. Later calls are no-ops; a failed install
/// is logged and leaves `/metrics` reporting that no recorder exists.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if METRICS_HANDLE.set(handle).is_err() {
                tracing::warn!("Metrics handle was already initialized");
            }
        }
        Err(e) => tracing::error!(error = %e, "Failed to install Prometheus recorder"),
    }
}

/// Get the current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

/// `newly_captured` is true only on the turn where the lead flipped to
/// captured.
pub fn record_chat_turn(newly_captured: bool) {
    metrics::counter!(CHAT_MESSAGES_TOTAL).increment(1);
    if newly_captured {
        metrics::counter!(CHAT_LEADS_CAPTURED_TOTAL).increment(1);
    }
}

pub fn record_meeting_request() {
    metrics::counter!(MEETING_REQUESTS_TOTAL).increment(1);
}

pub fn record_notification_failure(kind: &'static str) {
    metrics::counter!(NOTIFICATIONS_FAILED_TOTAL, "kind" => kind).increment(1);
}

pub fn record_contact_submission() {
    metrics::counter!(CONTACT_SUBMISSIONS_TOTAL).increment(1);
}
