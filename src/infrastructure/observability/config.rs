//! `[observability]` settings

use serde::Deserialize;

use crate::domain::auth::AuthError;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub tracing: TracingConfig,
    pub metrics: MetricsConfig,
}

impl ObservabilityConfig {
    pub fn validate(&self) -> Result<(), AuthError> {
        self.tracing.validate()?;
        self.metrics.validate()
    }
}

/// OTLP span export. Off unless enabled.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    pub enabled: bool,
    pub otlp_endpoint: String,
    pub service_name: String,
    /// Fraction of traces kept, 0.0 to 1.0
    pub sampling_ratio: f64,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            otlp_endpoint: "http://localhost:4317".to_string(),
            service_name: env!("CARGO_PKG_NAME").to_string(),
            sampling_ratio: 1.0,
        }
    }
}

impl TracingConfig {
    fn validate(&self) -> Result<(), AuthError> {
        if !(0.0..=1.0).contains(&self.sampling_ratio) {
            return Err(AuthError::misconfigured(format!(
                "observability.tracing.sampling_ratio must be within 0.0..=1.0, got {}",
                self.sampling_ratio
            )));
        }
        if self.enabled && self.otlp_endpoint.trim().is_empty() {
            return Err(AuthError::misconfigured(
                "observability.tracing.otlp_endpoint must be set when tracing is enabled",
            ));
        }
        Ok(())
    }
}

/// Prometheus scrape endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Route serving the exposition text. Needs a public policy when the
    /// policy table is configured by hand.
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    fn validate(&self) -> Result<(), AuthError> {
        if self.enabled && !self.path.starts_with('/') {
            return Err(AuthError::misconfigured(format!(
                "observability.metrics.path must start with '/', got '{}'",
                self.path
            )));
        }
        Ok(())
    }
}
