//! Logging and tracing setup shared by Grocify services
//!
//! # Example
//!
//! ```rust,no_run
//! use grocify_core::telemetry::{init_tracing, TracingConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_tracing(TracingConfig::from_env())?;
//!     Ok(())
//! }
//! ```

pub mod tracing;

pub use self::tracing::{
    db_query_span, external_api_span, init_tracing, TelemetryError, TracingConfig,
};
