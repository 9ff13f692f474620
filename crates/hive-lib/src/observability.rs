//! Observability for the gateway
//!
//! Provides:
//! - Prometheus metrics (validation rejections, lifecycle outcomes, upstream latency)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for upstream call latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Registered once per process; the Prometheus default registry is global
static GLOBAL_METRICS: OnceLock<GatewayMetricsInner> = OnceLock::new();

struct GatewayMetricsInner {
    validation_rejections: IntCounterVec,
    lifecycle_requests: IntCounterVec,
    upstream_latency_seconds: HistogramVec,
    port_checks_superseded: IntCounter,
}

impl GatewayMetricsInner {
    fn new() -> Self {
        Self {
            validation_rejections: register_int_counter_vec!(
                "hive_validation_rejections_total",
                "Submissions rejected by a validator",
                &["validator"]
            )
            .expect("Failed to register validation_rejections"),

            lifecycle_requests: register_int_counter_vec!(
                "hive_lifecycle_requests_total",
                "Lifecycle requests handled, by action and outcome",
                &["action", "outcome"]
            )
            .expect("Failed to register lifecycle_requests"),

            upstream_latency_seconds: register_histogram_vec!(
                "hive_upstream_latency_seconds",
                "Latency of calls to the container backend",
                &["action"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register upstream_latency_seconds"),

            port_checks_superseded: register_int_counter!(
                "hive_port_checks_superseded_total",
                "Port availability checks abandoned for a newer check"
            )
            .expect("Failed to register port_checks_superseded"),
        }
    }
}

/// Outcome label for lifecycle metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Rejected,
    Conflict,
    UpstreamError,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Rejected => "rejected",
            Outcome::Conflict => "conflict",
            Outcome::UpstreamError => "upstream_error",
        }
    }
}

/// Lightweight handle to the process-wide metrics; clones share state
#[derive(Clone)]
pub struct GatewayMetrics {
    _private: (),
}

impl Default for GatewayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(GatewayMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &GatewayMetricsInner {
        GLOBAL_METRICS.get_or_init(GatewayMetricsInner::new)
    }

    pub fn inc_validation_rejection(&self, validator: &str) {
        self.inner()
            .validation_rejections
            .with_label_values(&[validator])
            .inc();
    }

    pub fn record_lifecycle(&self, action: &str, outcome: Outcome) {
        self.inner()
            .lifecycle_requests
            .with_label_values(&[action, outcome.as_str()])
            .inc();
    }

    pub fn observe_upstream_latency(&self, action: &str, duration_secs: f64) {
        self.inner()
            .upstream_latency_seconds
            .with_label_values(&[action])
            .observe(duration_secs);
    }

    pub fn inc_port_check_superseded(&self) {
        self.inner().port_checks_superseded.inc();
    }

    pub fn lifecycle_count(&self, action: &str, outcome: Outcome) -> u64 {
        self.inner()
            .lifecycle_requests
            .with_label_values(&[action, outcome.as_str()])
            .get()
    }

    pub fn validation_rejection_count(&self, validator: &str) -> u64 {
        self.inner()
            .validation_rejections
            .with_label_values(&[validator])
            .get()
    }
}

/// Event-tagged log records for honeypot operations
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn log_startup(&self, version: &str, upstream_url: &str, catalog_types: usize) {
        info!(
            event = "gateway_started",
            instance = %self.instance,
            version = %version,
            upstream_url = %upstream_url,
            catalog_types = catalog_types,
            "H.I.V.E gateway started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "gateway_shutdown",
            instance = %self.instance,
            reason = %reason,
            "H.I.V.E gateway shutting down"
        );
    }

    pub fn log_lifecycle(&self, honeypot: &str, action: &str, outcome: Outcome, detail: &str) {
        match outcome {
            Outcome::Success => info!(
                event = "honeypot_lifecycle",
                instance = %self.instance,
                honeypot = %honeypot,
                action = %action,
                outcome = outcome.as_str(),
                detail = %detail,
                "Honeypot lifecycle request completed"
            ),
            _ => warn!(
                event = "honeypot_lifecycle",
                instance = %self.instance,
                honeypot = %honeypot,
                action = %action,
                outcome = outcome.as_str(),
                detail = %detail,
                "Honeypot lifecycle request failed"
            ),
        }
    }

    pub fn log_submission_rejected(&self, honeypot_type: &str, port: u32, messages: &[String]) {
        warn!(
            event = "submission_rejected",
            instance = %self.instance,
            honeypot_type = %honeypot_type,
            port = port,
            failures = messages.len(),
            messages = ?messages,
            "Honeypot submission failed validation"
        );
    }

    pub fn log_service_bulk_action(&self, action: &str, success: bool, detail: &str) {
        if success {
            info!(
                event = "service_bulk_action",
                instance = %self.instance,
                action = %action,
                detail = %detail,
                "Service bulk action completed"
            );
        } else {
            warn!(
                event = "service_bulk_action",
                instance = %self.instance,
                action = %action,
                detail = %detail,
                "Service bulk action failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_handles_share_registry() {
        let a = GatewayMetrics::new();
        let b = GatewayMetrics::new();

        let before = b.lifecycle_count("unit-test-start", Outcome::Success);
        a.record_lifecycle("unit-test-start", Outcome::Success);
        assert_eq!(b.lifecycle_count("unit-test-start", Outcome::Success), before + 1);

        a.inc_validation_rejection("unit-test-banner");
        assert!(b.validation_rejection_count("unit-test-banner") >= 1);

        a.observe_upstream_latency("unit-test-start", 0.02);
        a.inc_port_check_superseded();
    }

    #[test]
    fn test_structured_logger() {
        let logger = StructuredLogger::new("gateway-1");
        assert_eq!(logger.instance(), "gateway-1");
        logger.log_lifecycle("hive-ssh-2222", "start", Outcome::Conflict, "stop in progress");
    }
}
