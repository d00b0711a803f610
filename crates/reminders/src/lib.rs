//! Grocify expiry reminders
//!
//! Periodically scans every user's pantry, finds items whose effective
//! expiry date is exactly a configured number of days away and sends each
//! owner a single consolidated email.

pub mod batch;
pub mod config;
pub mod email;
pub mod error;
pub mod expiry;
pub mod recipes;
pub mod schedule;
pub mod server;
pub mod store;
pub mod sweep;

pub use batch::{build_batches, BatchEntry, BatchPlan, NotificationBatch};
pub use config::{default_run_at, RecipeConfig, ReminderConfig, SweepSchedule};
pub use email::{
    build_dispatcher, EmailConfig, EmailError, EmailMessage, NotificationDispatcher,
    TemplateEngine,
};
pub use error::{ReminderError, Result};
pub use expiry::{ReminderThresholds, DEFAULT_THRESHOLDS};
pub use recipes::{Recipe, RecipeClient, RecipeError, RecipeSource};
pub use schedule::{
    manual_ticker, next_run_at, run_scheduler, Clock, DailyTicker, FixedClock, IntervalTicker,
    ManualTicker, ManualTrigger, SystemClock, Ticker,
};
pub use store::{InventoryRepository, PostgresStore, ReminderCandidate, ReminderStore};
pub use sweep::{ExpirySweep, SweepOutcome, SweepReport};
