//! Tracing subscriber configuration and span helpers

use thiserror::Error;
use tracing::{span, Level, Span};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Telemetry configuration errors
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Invalid log filter '{0}'")]
    InvalidFilter(String),

    #[error("Failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Configuration for the tracing subscriber
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Service name attached to the startup event
    pub service_name: String,

    /// Filter directive used when `RUST_LOG` is unset
    pub default_filter: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: "grocify".to_string(),
            default_filter: "info".to_string(),
            json: false,
        }
    }
}

impl TracingConfig {
    /// Create config from environment variables
    ///
    /// - SERVICE_NAME: Service identifier
    /// - GROCIFY_SERVICE_LOG_LEVEL: default filter when RUST_LOG is unset
    /// - GROCIFY_LOG_JSON: "true"/"1" for JSON output; production defaults to JSON
    pub fn from_env() -> Self {
        let service_name =
            std::env::var("SERVICE_NAME").unwrap_or_else(|_| "grocify".to_string());

        let default_filter =
            std::env::var("GROCIFY_SERVICE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let is_production = std::env::var("RUST_ENV")
            .map(|e| e == "production")
            .unwrap_or(false);

        let json = std::env::var("GROCIFY_LOG_JSON")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(is_production);

        Self {
            service_name,
            default_filter,
            json,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), TelemetryError> {
        EnvFilter::try_new(&self.default_filter)
            .map(|_| ())
            .map_err(|_| TelemetryError::InvalidFilter(self.default_filter.clone()))
    }
}

/// Install the global tracing subscriber
///
/// Must be called once at application startup.
///
/// # Errors
///
/// Returns error if the configuration is invalid or a global subscriber is
/// already installed.
pub fn init_tracing(config: TracingConfig) -> Result<(), TelemetryError> {
    config.validate()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config.json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
            .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;
    } else {
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true),
            )
            .try_init()
            .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;
    }

    tracing::info!(
        service_name = %config.service_name,
        json = config.json,
        "Tracing initialized"
    );

    Ok(())
}

/// Create a database query span
pub fn db_query_span(operation: &str, table: &str) -> Span {
    span!(
        Level::DEBUG,
        "db.query",
        db.system = "postgresql",
        db.operation = %operation,
        db.table = %table,
    )
}

/// Create an external API call span
pub fn external_api_span(method: &str, url: &str, service: &str) -> Span {
    span!(
        Level::INFO,
        "http.client",
        http.method = %method,
        http.url = %url,
        peer.service = %service,
    )
}
