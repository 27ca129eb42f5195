use crate::config::ConfigError;
use crate::store::StoreError;
use crate::telemetry::TelemetryError;

/// Top-level error for hosts wiring the engines together.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
