use std::env;

use serde::{Deserialize, Serialize};

/// Distinguishes runtime behavior for different stages of the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for hosts embedding the engines.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub advice: AdviceConfig,
    pub snapshot: SnapshotConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("FINSIGHT_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("FINSIGHT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let mut advice = AdviceConfig::default();
        if let Ok(model) = env::var("FINSIGHT_TEXT_MODEL") {
            advice.model = model;
        }
        if let Ok(max_tokens) = env::var("FINSIGHT_TEXT_MAX_TOKENS") {
            advice.max_tokens = max_tokens
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidMaxTokens)?;
        }

        let mut snapshot = SnapshotConfig::default();
        if let Ok(limit) = env::var("FINSIGHT_ASSUMED_CARD_LIMIT") {
            snapshot.assumed_card_limit = limit
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidCardLimit)?;
        }

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            advice,
            snapshot,
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Knobs for the text-generation side of the advice composer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceConfig {
    pub model: String,
    pub max_tokens: u32,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            model: "@cf/meta/llama-3.1-8b-instruct".to_string(),
            max_tokens: 1024,
        }
    }
}

/// Knobs for the credit data snapshot builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Flat limit assumed per credit-kind asset account; real issuer limits
    /// are not available through the account store.
    pub assumed_card_limit: f64,
    /// How far back transactions feed the payment-history heuristics.
    pub transaction_lookback_months: u32,
    /// Hard inquiries counted toward the inquiries factor are capped here.
    pub inquiry_cap: u32,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            assumed_card_limit: 5_000.0,
            transaction_lookback_months: 6,
            inquiry_cap: 10,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("FINSIGHT_TEXT_MAX_TOKENS must be a valid u32")]
    InvalidMaxTokens,
    #[error("FINSIGHT_ASSUMED_CARD_LIMIT must be a valid number")]
    InvalidCardLimit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("FINSIGHT_ENV");
        env::remove_var("FINSIGHT_LOG_LEVEL");
        env::remove_var("FINSIGHT_TEXT_MODEL");
        env::remove_var("FINSIGHT_TEXT_MAX_TOKENS");
        env::remove_var("FINSIGHT_ASSUMED_CARD_LIMIT");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.snapshot.assumed_card_limit, 5_000.0);
        assert_eq!(config.snapshot.transaction_lookback_months, 6);
    }

    #[test]
    fn rejects_malformed_card_limit() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("FINSIGHT_ASSUMED_CARD_LIMIT", "not-a-number");
        let err = AppConfig::load().expect_err("malformed limit rejected");
        assert!(matches!(err, ConfigError::InvalidCardLimit));
    }

    #[test]
    fn reads_model_override() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("FINSIGHT_TEXT_MODEL", "test-model");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.advice.model, "test-model");
    }
}
