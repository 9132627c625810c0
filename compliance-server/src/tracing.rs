//! OpenTelemetry tracing integration for the compliance server.

use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    runtime,
    trace::{self, RandomIdGenerator, Sampler},
    Resource,
};
use std::time::Duration;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Initialize OpenTelemetry with OTLP exporter
pub fn init_telemetry(service_name: &str) -> anyhow::Result<opentelemetry_sdk::trace::Tracer> {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());

    let resource = Resource::new(vec![
        KeyValue::new("service.name", service_name.to_string()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);

    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint)
        .with_timeout(Duration::from_secs(3));

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(
            trace::config()
                .with_sampler(get_sampler())
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(resource),
        )
        .install_batch(runtime::Tokio)?;

    Ok(tracer)
}

fn get_sampler() -> Sampler {
    let sample_rate = std::env::var("OTEL_TRACES_SAMPLER_ARG")
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(1.0);

    if sample_rate >= 1.0 {
        Sampler::AlwaysOn
    } else if sample_rate <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(sample_rate)
    }
}

/// Initialize the complete tracing stack (console + OpenTelemetry)
pub fn init_tracing_stack(service_name: &str) -> anyhow::Result<()> {
    let tracer = init_telemetry(service_name)?;
    let otel_layer = OpenTelemetryLayer::new(tracer);

    let fmt_layer = tracing_subscriber::fmt::layer().with_thread_ids(true).with_thread_names(true);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,compliance=debug"));

    Registry::default().with(filter).with(fmt_layer).with(otel_layer).init();
    Ok(())
}

/// Shutdown OpenTelemetry provider
pub fn shutdown_telemetry() {
    opentelemetry::global::shutdown_tracer_provider();
}

/// Record the reached decision on the current span.
pub fn record_decision(decision: &str, latency_ms: f64) {
    tracing::Span::current().record("decision", decision);
    tracing::Span::current().record("latency_ms", latency_ms);
    tracing::Span::current().record("otel.status_code", "OK");
}

/// Record an error on the current span.
pub fn record_error(error: &str) {
    tracing::Span::current().record("otel.status_code", "ERROR");
    tracing::Span::current().record("error", error);
}
