//! Logging, OpenTelemetry export and Prometheus metrics

mod config;
mod metrics;
mod tracing_setup;

pub use config::{MetricsConfig, ObservabilityConfig, TracingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_analysis, record_gate_decision, record_http_request,
    record_llm_request, LlmRequestMetricParams, PrometheusMetrics,
};
pub use tracing_setup::{init_tracing, shutdown_tracing};
