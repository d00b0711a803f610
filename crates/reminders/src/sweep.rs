//! The expiry sweep
//!
//! One run loads every active item with its owner's email, evaluates each
//! item against the reminder thresholds for "today", groups due items per
//! owner and sends one consolidated reminder per owner.
//!
//! A store failure aborts the run. A dispatch failure for one owner is
//! logged and the run moves on to the next owner. Runs never overlap: a
//! trigger that arrives while a run is in flight is skipped.

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::batch::{build_batches, NotificationBatch};
use crate::config::ReminderConfig;
use crate::email::{EmailError, NotificationDispatcher, TemplateEngine};
use crate::error::Result;
use crate::expiry::ReminderThresholds;
use crate::recipes::{Recipe, RecipeSource};
use crate::schedule::Clock;
use crate::store::ReminderStore;

/// Counters for one completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub run_date: NaiveDate,
    pub scanned: usize,
    pub unresolvable: usize,
    pub qualifying: usize,
    pub batches: usize,
    pub sent: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    Completed(SweepReport),
    /// Another run held the in-flight guard
    Skipped,
}

#[derive(Debug, Error)]
enum DispatchError {
    #[error(transparent)]
    Email(#[from] EmailError),

    #[error("dispatch timed out after {0}ms")]
    TimedOut(u64),
}

struct RecipeSuggestions {
    source: Arc<dyn RecipeSource>,
    timeout: Duration,
    max_suggestions: usize,
}

pub struct ExpirySweep {
    store: Arc<dyn ReminderStore>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
    templates: TemplateEngine,
    thresholds: ReminderThresholds,
    dispatch_timeout: Duration,
    recipes: Option<RecipeSuggestions>,
    in_flight: Mutex<()>,
}

impl ExpirySweep {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        clock: Arc<dyn Clock>,
        templates: TemplateEngine,
        config: &ReminderConfig,
    ) -> Self {
        Self {
            store,
            dispatcher,
            clock,
            templates,
            thresholds: config.thresholds.clone(),
            dispatch_timeout: config.dispatch_timeout,
            recipes: None,
            in_flight: Mutex::new(()),
        }
    }

    /// Attach a recipe source used to enrich reminders
    pub fn with_recipes(
        mut self,
        source: Arc<dyn RecipeSource>,
        timeout: Duration,
        max_suggestions: usize,
    ) -> Self {
        self.recipes = Some(RecipeSuggestions {
            source,
            timeout,
            max_suggestions,
        });
        self
    }

    pub fn thresholds(&self) -> &ReminderThresholds {
        &self.thresholds
    }

    /// Whether the backing store is reachable
    pub async fn is_ready(&self) -> bool {
        self.store.is_healthy().await
    }

    /// Evaluate and dispatch reminders for today
    ///
    /// # Errors
    ///
    /// Returns the store error when candidates cannot be loaded. Nothing is
    /// dispatched in that case.
    pub async fn run_once(&self) -> Result<SweepOutcome> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("Expiry sweep already in flight, skipping trigger");
            return Ok(SweepOutcome::Skipped);
        };

        let started = Instant::now();
        let today = self.clock.today();
        info!(today = %today, thresholds = ?self.thresholds.days(), "Running expiry sweep");

        let candidates = self.store.fetch_reminder_candidates().await.map_err(|e| {
            error!(error = %e, "Failed to load reminder candidates, aborting sweep");
            e
        })?;

        let plan = build_batches(&candidates, today, &self.thresholds);

        let mut sent = 0;
        let mut failed = 0;

        for batch in &plan.batches {
            match self.dispatch(batch).await {
                Ok(()) => {
                    sent += 1;
                    debug!(
                        user_id = %batch.user_id,
                        items = batch.entries.len(),
                        "Sent expiry reminder"
                    );
                }
                Err(e) => {
                    failed += 1;
                    error!(
                        user_id = %batch.user_id,
                        provider = self.dispatcher.name(),
                        error = %e,
                        "Failed to send expiry reminder"
                    );
                }
            }
        }

        let report = SweepReport {
            run_date: today,
            scanned: plan.scanned,
            unresolvable: plan.unresolvable,
            qualifying: plan.qualifying,
            batches: plan.batches.len(),
            sent,
            failed,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            scanned = report.scanned,
            qualifying = report.qualifying,
            sent = report.sent,
            failed = report.failed,
            duration_ms = report.duration_ms,
            "Completed expiry sweep"
        );

        Ok(SweepOutcome::Completed(report))
    }

    /// Compute today's batch for one user without sending it
    pub async fn preview_for_user(&self, user_id: Uuid) -> Result<Option<NotificationBatch>> {
        let today = self.clock.today();
        let candidates = self.store.fetch_reminder_candidates_for_user(user_id).await?;

        let plan = build_batches(&candidates, today, &self.thresholds);
        Ok(plan.batches.into_iter().find(|b| b.user_id == user_id))
    }

    async fn dispatch(&self, batch: &NotificationBatch) -> std::result::Result<(), DispatchError> {
        let recipes = self.recipe_ideas(batch).await;
        let message = self.templates.render_reminder(batch, &recipes);

        match timeout(self.dispatch_timeout, self.dispatcher.send(&batch.email, &message)).await {
            Ok(result) => result.map_err(DispatchError::from),
            Err(_) => Err(DispatchError::TimedOut(
                self.dispatch_timeout.as_millis() as u64,
            )),
        }
    }

    async fn recipe_ideas(&self, batch: &NotificationBatch) -> Vec<Recipe> {
        let Some(recipes) = &self.recipes else {
            return Vec::new();
        };

        match timeout(recipes.timeout, recipes.source.suggest(&batch.item_names())).await {
            Ok(Ok(mut suggestions)) => {
                suggestions.truncate(recipes.max_suggestions);
                suggestions
            }
            Ok(Err(e)) => {
                warn!(user_id = %batch.user_id, error = %e, "Recipe suggestions unavailable");
                Vec::new()
            }
            Err(_) => {
                warn!(user_id = %batch.user_id, "Recipe suggestions timed out");
                Vec::new()
            }
        }
    }
}
