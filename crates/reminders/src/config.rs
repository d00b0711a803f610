//! Reminder service configuration
//!
//! # Environment Variables
//!
//! - `GROCIFY_REMINDER_THRESHOLDS`: comma-separated day offsets (default: "5,0")
//! - `GROCIFY_REMINDER_RUN_AT`: local wall-clock time of the daily sweep (default: "08:00")
//! - `GROCIFY_REMINDER_INTERVAL_SECS`: when set, sweep every N seconds from boot instead
//! - `GROCIFY_REMINDER_RUN_ON_STARTUP`: also sweep immediately at boot (default: false)
//! - `GROCIFY_REMINDER_DISPATCH_TIMEOUT_MS`: per-message send budget (default: 10000)
//! - `GROCIFY_RECIPE_SERVICE_URL`: enables recipe ideas when set
//! - `GROCIFY_RECIPE_TIMEOUT_MS`: recipe request budget (default: 5000)
//! - `GROCIFY_RECIPE_MAX_SUGGESTIONS`: recipes per reminder (default: 3)

use chrono::NaiveTime;
use grocify_core::{parse_env_list, parse_env_var, ConfigLoader, GrocifyError};
use std::time::Duration;

use crate::expiry::{ReminderThresholds, DEFAULT_THRESHOLDS};

/// Default local time of the daily sweep, 08:00
pub fn default_run_at() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default()
}

/// When scheduled sweeps fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepSchedule {
    /// Once a day at a local wall-clock time
    Daily { at: NaiveTime },
    /// Fixed period counted from process start
    Every(Duration),
}

#[derive(Debug, Clone)]
pub struct ReminderConfig {
    pub thresholds: ReminderThresholds,
    pub schedule: SweepSchedule,
    pub run_on_startup: bool,
    pub dispatch_timeout: Duration,
    pub recipes: Option<RecipeConfig>,
}

#[derive(Debug, Clone)]
pub struct RecipeConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub max_suggestions: usize,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            thresholds: ReminderThresholds::default(),
            schedule: SweepSchedule::Daily { at: default_run_at() },
            run_on_startup: false,
            dispatch_timeout: Duration::from_secs(10),
            recipes: None,
        }
    }
}

impl ConfigLoader for ReminderConfig {
    fn from_env() -> Result<Self, GrocifyError> {
        let days = parse_env_list("GROCIFY_REMINDER_THRESHOLDS", DEFAULT_THRESHOLDS.to_vec())?;
        let thresholds =
            ReminderThresholds::from_days(days).map_err(|e| GrocifyError::ConfigurationError {
                message: e.to_string(),
                key: Some("GROCIFY_REMINDER_THRESHOLDS".to_string()),
            })?;

        let schedule = match std::env::var("GROCIFY_REMINDER_INTERVAL_SECS") {
            Ok(_) => SweepSchedule::Every(Duration::from_secs(parse_env_var(
                "GROCIFY_REMINDER_INTERVAL_SECS",
                0u64,
            )?)),
            Err(_) => SweepSchedule::Daily {
                at: match std::env::var("GROCIFY_REMINDER_RUN_AT") {
                    Ok(raw) => parse_run_at(&raw)?,
                    Err(_) => default_run_at(),
                },
            },
        };
        let run_on_startup = parse_env_var("GROCIFY_REMINDER_RUN_ON_STARTUP", false)?;
        let dispatch_timeout_ms = parse_env_var("GROCIFY_REMINDER_DISPATCH_TIMEOUT_MS", 10_000u64)?;

        let recipes = match std::env::var("GROCIFY_RECIPE_SERVICE_URL") {
            Ok(base_url) if !base_url.trim().is_empty() => Some(RecipeConfig {
                base_url,
                timeout: Duration::from_millis(parse_env_var(
                    "GROCIFY_RECIPE_TIMEOUT_MS",
                    5_000u64,
                )?),
                max_suggestions: parse_env_var("GROCIFY_RECIPE_MAX_SUGGESTIONS", 3usize)?,
            }),
            _ => None,
        };

        Ok(Self {
            thresholds,
            schedule,
            run_on_startup,
            dispatch_timeout: Duration::from_millis(dispatch_timeout_ms),
            recipes,
        })
    }

    fn validate(&self) -> Result<(), GrocifyError> {
        if self.schedule == SweepSchedule::Every(Duration::ZERO) {
            return Err(GrocifyError::ConfigurationError {
                message: "sweep interval must be greater than 0 seconds".to_string(),
                key: Some("GROCIFY_REMINDER_INTERVAL_SECS".to_string()),
            });
        }

        if self.dispatch_timeout.is_zero() {
            return Err(GrocifyError::ConfigurationError {
                message: "dispatch timeout must be greater than 0".to_string(),
                key: Some("GROCIFY_REMINDER_DISPATCH_TIMEOUT_MS".to_string()),
            });
        }

        if let Some(recipes) = &self.recipes {
            url::Url::parse(&recipes.base_url).map_err(|e| GrocifyError::ConfigurationError {
                message: format!("Invalid recipe service URL: {}", e),
                key: Some("GROCIFY_RECIPE_SERVICE_URL".to_string()),
            })?;

            if recipes.timeout.is_zero() {
                return Err(GrocifyError::ConfigurationError {
                    message: "recipe timeout must be greater than 0".to_string(),
                    key: Some("GROCIFY_RECIPE_TIMEOUT_MS".to_string()),
                });
            }
        }

        Ok(())
    }
}

/// Parse "HH:MM" or "HH:MM:SS"
fn parse_run_at(raw: &str) -> Result<NaiveTime, GrocifyError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| GrocifyError::ConfigurationError {
            message: format!("Invalid run time '{}', expected HH:MM", raw),
            key: Some("GROCIFY_REMINDER_RUN_AT".to_string()),
        })
}
