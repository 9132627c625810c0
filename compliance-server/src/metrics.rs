//! Prometheus metrics collection for the compliance server.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, histogram};
use std::time::Instant;

/// Initialize all metric descriptions
pub fn init_metrics() {
    describe_counter!("compliance_transactions_ingested_total", "Total number of transactions ingested");
    describe_counter!("compliance_rule_evaluations_total", "Total number of rule evaluations performed");
    describe_counter!("compliance_alerts_created_total", "Total number of alerts created");
    describe_counter!("compliance_alerts_suppressed_total", "Total number of alerts suppressed into an existing dedup bucket");
    describe_counter!("compliance_cache_hits_total", "Total number of cache hits");
    describe_counter!("compliance_cache_misses_total", "Total number of cache misses");
    describe_counter!("compliance_errors_total", "Total number of request errors");

    describe_histogram!("compliance_evaluation_latency_seconds", "Transaction evaluation latency in seconds");
    describe_histogram!("compliance_ingestion_latency_seconds", "End-to-end ingestion request latency in seconds");

    describe_gauge!("compliance_active_rules_count", "Number of active rule versions loaded for an organization");
}

/// Record a completed ingestion request.
pub fn record_ingestion(decision: &str, latency_seconds: f64) {
    counter!("compliance_transactions_ingested_total", "decision" => decision.to_string()).increment(1);
    histogram!("compliance_ingestion_latency_seconds").record(latency_seconds);
}

/// Record a request-handling error. Cache, alert-outcome, and active-rules
/// metrics are recorded directly in `compliance-core` where those events
/// actually occur (cache.rs callers, alerts.rs consolidation); this crate
/// only owns the descriptions (`init_metrics`) and the HTTP-layer counters.
pub fn record_error(error_code: &str) {
    counter!("compliance_errors_total", "code" => error_code.to_string()).increment(1);
}

/// Timer for measuring operation latency.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    pub fn new(metric_name: &'static str) -> Self {
        Self { start: Instant::now(), metric_name }
    }

    pub fn record(self) {
        let elapsed = self.start.elapsed().as_secs_f64();
        histogram!(self.metric_name).record(elapsed);
    }
}

/// Storage for Prometheus handle
static PROMETHEUS_HANDLE: std::sync::OnceLock<metrics_exporter_prometheus::PrometheusHandle> =
    std::sync::OnceLock::new();

/// Initialize Prometheus exporter and return the handle
pub fn init_prometheus() -> anyhow::Result<()> {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let handle = builder.install_recorder()?;
    PROMETHEUS_HANDLE.set(handle).map_err(|_| anyhow::anyhow!("Failed to set Prometheus handle"))?;
    Ok(())
}

/// Get Prometheus metrics string
pub fn get_prometheus_metrics() -> String {
    PROMETHEUS_HANDLE.get().map(|handle| handle.render()).unwrap_or_else(|| "# Prometheus metrics not initialized\n".to_string())
}
