//! Shared configuration loader for Grocify services
//!
//! All configuration is read from environment variables with the `GROCIFY_`
//! prefix. A `.env` file is honoured when [`load_dotenv`] is called first.
//! Precedence: defaults < .env < environment.
//!
//! # Example
//!
//! ```no_run
//! use grocify_core::config::{ConfigLoader, DatabaseConfig, ServiceConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! grocify_core::config::load_dotenv();
//!
//! let db_config = DatabaseConfig::from_env()?;
//! let service_config = ServiceConfig::from_env()?;
//!
//! db_config.validate()?;
//! service_config.validate()?;
//! # Ok(())
//! # }
//! ```

use crate::error::GrocifyError;
use std::time::Duration;
use url::Url;

/// Configuration loader trait
///
/// Provides standardized methods for loading and validating configuration from
/// environment variables.
pub trait ConfigLoader: Sized {
    /// Load configuration from environment variables, using defaults for
    /// missing optional values.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if a required variable is missing or a
    /// value cannot be parsed.
    fn from_env() -> Result<Self, GrocifyError>;

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if any validation check fails.
    fn validate(&self) -> Result<(), GrocifyError>;
}

/// Database configuration
///
/// # Environment Variables
///
/// - `GROCIFY_DATABASE_URL` (required, falls back to `DATABASE_URL`)
/// - `GROCIFY_DATABASE_MAX_CONNECTIONS` (default: 10)
/// - `GROCIFY_DATABASE_MIN_CONNECTIONS` (default: 1)
/// - `GROCIFY_DATABASE_CONNECT_TIMEOUT` seconds (default: 30)
/// - `GROCIFY_DATABASE_IDLE_TIMEOUT` seconds (default: 600)
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections in the pool
    pub min_connections: u32,
    /// Connection acquire timeout
    pub connect_timeout: Duration,
    /// Idle connection timeout
    pub idle_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/grocify".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl ConfigLoader for DatabaseConfig {
    fn from_env() -> Result<Self, GrocifyError> {
        let url = std::env::var("GROCIFY_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .map_err(|_| GrocifyError::ConfigurationError {
                message: "DATABASE_URL or GROCIFY_DATABASE_URL must be set".to_string(),
                key: Some("GROCIFY_DATABASE_URL".to_string()),
            })?;

        let defaults = DatabaseConfig::default();

        let max_connections =
            parse_env_var("GROCIFY_DATABASE_MAX_CONNECTIONS", defaults.max_connections)?;
        let min_connections =
            parse_env_var("GROCIFY_DATABASE_MIN_CONNECTIONS", defaults.min_connections)?;
        let connect_timeout_secs = parse_env_var("GROCIFY_DATABASE_CONNECT_TIMEOUT", 30u64)?;
        let idle_timeout_secs = parse_env_var("GROCIFY_DATABASE_IDLE_TIMEOUT", 600u64)?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            idle_timeout: Duration::from_secs(idle_timeout_secs),
        })
    }

    fn validate(&self) -> Result<(), GrocifyError> {
        Url::parse(&self.url).map_err(|e| GrocifyError::ConfigurationError {
            message: format!("Invalid DATABASE_URL: {}", e),
            key: Some("GROCIFY_DATABASE_URL".to_string()),
        })?;

        if self.max_connections == 0 {
            return Err(GrocifyError::ConfigurationError {
                message: "max_connections must be greater than 0".to_string(),
                key: Some("GROCIFY_DATABASE_MAX_CONNECTIONS".to_string()),
            });
        }

        if self.min_connections > self.max_connections {
            return Err(GrocifyError::ConfigurationError {
                message: format!(
                    "min_connections ({}) cannot exceed max_connections ({})",
                    self.min_connections, self.max_connections
                ),
                key: Some("GROCIFY_DATABASE_MIN_CONNECTIONS".to_string()),
            });
        }

        if self.connect_timeout.as_secs() == 0 {
            return Err(GrocifyError::ConfigurationError {
                message: "connect_timeout must be greater than 0 seconds".to_string(),
                key: Some("GROCIFY_DATABASE_CONNECT_TIMEOUT".to_string()),
            });
        }

        Ok(())
    }
}

/// HTTP service configuration
///
/// # Environment Variables
///
/// - `GROCIFY_SERVICE_HOST` (default: "0.0.0.0", falls back to `HOST`)
/// - `GROCIFY_SERVICE_PORT` (default: 8090, falls back to `PORT`)
/// - `GROCIFY_SERVICE_WORKERS` (default: CPU count)
///
/// Log filtering is configured separately through
/// [`TracingConfig`](crate::telemetry::TracingConfig).
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8090,
            workers: num_cpus::get(),
        }
    }
}

impl ConfigLoader for ServiceConfig {
    fn from_env() -> Result<Self, GrocifyError> {
        let defaults = ServiceConfig::default();

        let host = std::env::var("GROCIFY_SERVICE_HOST")
            .or_else(|_| std::env::var("HOST"))
            .unwrap_or(defaults.host);

        let port = match std::env::var("GROCIFY_SERVICE_PORT") {
            Ok(_) => parse_env_var("GROCIFY_SERVICE_PORT", defaults.port)?,
            Err(_) => parse_env_var("PORT", defaults.port)?,
        };

        let workers = parse_env_var("GROCIFY_SERVICE_WORKERS", defaults.workers)?;

        Ok(Self {
            host,
            port,
            workers,
        })
    }

    fn validate(&self) -> Result<(), GrocifyError> {
        if self.port == 0 {
            return Err(GrocifyError::ConfigurationError {
                message: "port must be greater than 0".to_string(),
                key: Some("GROCIFY_SERVICE_PORT".to_string()),
            });
        }

        if self.workers == 0 {
            return Err(GrocifyError::ConfigurationError {
                message: "workers must be greater than 0".to_string(),
                key: Some("GROCIFY_SERVICE_WORKERS".to_string()),
            });
        }

        Ok(())
    }
}

/// Parse an environment variable, falling back to `default` when unset
///
/// # Errors
///
/// Returns a `ConfigurationError` if the variable is set but cannot be parsed.
pub fn parse_env_var<T>(key: &str, default: T) -> Result<T, GrocifyError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .ok()
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|e| GrocifyError::ConfigurationError {
                    message: format!("Failed to parse {}: {}", key, e),
                    key: Some(key.to_string()),
                })
        })
        .unwrap_or(Ok(default))
}

/// Parse a comma-separated environment variable into a list
///
/// Blank entries are ignored. Returns `default` when the variable is unset.
pub fn parse_env_list<T>(key: &str, default: Vec<T>) -> Result<Vec<T>, GrocifyError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = match std::env::var(key) {
        Ok(raw) => raw,
        Err(_) => return Ok(default),
    };

    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<T>().map_err(|e| GrocifyError::ConfigurationError {
                message: format!("Failed to parse {} entry '{}': {}", key, s, e),
                key: Some(key.to_string()),
            })
        })
        .collect()
}

/// Load .env file if present
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }
}
