//! Prometheus metrics for the face registry.
//!
//! This module provides:
//! - Request counters per operation and status
//! - Enrollment, update and authentication outcome counters
//! - Store load/save latency histograms

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use strum::{Display, EnumString};
use tracing::debug;

use crate::error::ServiceError;

// === Metric Name Constants ===

/// Requests handled, labelled by operation and status code.
pub const METRIC_REQUESTS: &str = "face_requests_total";
/// Profiles enrolled counter metric name.
pub const METRIC_PROFILES_REGISTERED: &str = "profiles_registered_total";
/// Profiles updated counter metric name.
pub const METRIC_PROFILES_UPDATED: &str = "profiles_updated_total";
/// Successful authentications counter metric name.
pub const METRIC_AUTH_SUCCESS: &str = "authentications_succeeded_total";
/// Rejected authentications counter metric name.
pub const METRIC_AUTH_FAILURE: &str = "authentications_failed_total";
/// Store errors counter metric name.
pub const METRIC_STORE_ERRORS: &str = "store_errors_total";
/// Store load latency metric name.
pub const METRIC_STORE_LOAD_LATENCY: &str = "store_load_latency_ms";
/// Store save latency metric name.
pub const METRIC_STORE_SAVE_LATENCY: &str = "store_save_latency_ms";

/// API operation, used as a metric label and log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    /// Enroll a new profile.
    Register,
    /// List every profile.
    List,
    /// Replace a profile's landmarks.
    Update,
    /// Verify submitted landmarks.
    Authenticate,
}

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(
        METRIC_REQUESTS,
        "Total number of API requests by operation and status"
    );
    describe_counter!(
        METRIC_PROFILES_REGISTERED,
        "Total number of profiles enrolled"
    );
    describe_counter!(METRIC_PROFILES_UPDATED, "Total number of profile updates");
    describe_counter!(METRIC_AUTH_SUCCESS, "Total number of successful authentications");
    describe_counter!(METRIC_AUTH_FAILURE, "Total number of rejected authentications");
    describe_counter!(METRIC_STORE_ERRORS, "Total number of store failures by kind");

    describe_histogram!(
        METRIC_STORE_LOAD_LATENCY,
        "Profile store load latency in milliseconds"
    );
    describe_histogram!(
        METRIC_STORE_SAVE_LATENCY,
        "Profile store save latency in milliseconds"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and return its render handle.
pub fn install_recorder() -> Result<PrometheusHandle, ServiceError> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServiceError::Metrics(e.to_string()))
}

/// Count a handled request.
pub fn record_request(operation: Operation, status: u16) {
    counter!(
        METRIC_REQUESTS,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Increment profiles registered counter.
pub fn inc_profiles_registered() {
    counter!(METRIC_PROFILES_REGISTERED).increment(1);
}

/// Increment profiles updated counter.
pub fn inc_profiles_updated() {
    counter!(METRIC_PROFILES_UPDATED).increment(1);
}

/// Increment successful authentications counter.
pub fn inc_auth_success() {
    counter!(METRIC_AUTH_SUCCESS).increment(1);
}

/// Increment rejected authentications counter.
pub fn inc_auth_failure() {
    counter!(METRIC_AUTH_FAILURE).increment(1);
}

/// Increment store errors counter.
pub fn inc_store_errors(kind: &'static str) {
    counter!(METRIC_STORE_ERRORS, "kind" => kind).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(self.metric_name).record(self.elapsed_ms());
    }
}

/// Create a latency timer for store loads.
pub fn timer_store_load() -> LatencyTimer {
    LatencyTimer::new(METRIC_STORE_LOAD_LATENCY)
}

/// Create a latency timer for store saves.
pub fn timer_store_save() -> LatencyTimer {
    LatencyTimer::new(METRIC_STORE_SAVE_LATENCY)
}
