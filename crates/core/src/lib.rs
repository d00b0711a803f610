//! # Grocify Core
//!
//! Shared building blocks for the Grocify services.
//!
//! ## Modules
//!
//! - `config`: Environment configuration loading and validation
//! - `database`: Shared PostgreSQL connection pool
//! - `error`: Shared error type
//! - `models`: Users, items and archived items
//! - `telemetry`: Tracing subscriber setup and span helpers

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod telemetry;

pub use config::{load_dotenv, parse_env_list, parse_env_var, ConfigLoader, DatabaseConfig, ServiceConfig};
pub use database::DatabasePool;
pub use error::{GrocifyError, Result};
pub use models::{ArchivedItem, CreateItemRequest, CreateUserRequest, Item, User};
pub use telemetry::{init_tracing, TracingConfig};
