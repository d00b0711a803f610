#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate};
use grocify_core::{GrocifyError, Result as CoreResult};
use grocify_reminders::{
    ExpirySweep, FixedClock, NotificationDispatcher, Recipe, RecipeError, RecipeSource,
    ReminderCandidate, ReminderConfig, ReminderStore, TemplateEngine,
};
use grocify_reminders::{EmailError, EmailMessage};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

pub fn days_from_today(days: i64) -> NaiveDate {
    today() + ChronoDuration::days(days)
}

/// In-memory candidate rows
#[derive(Default)]
pub struct InMemoryStore {
    rows: Mutex<Vec<ReminderCandidate>>,
    fail: AtomicBool,
    healthy: AtomicBool,
    fetches: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        let store = Self::default();
        store.healthy.store(true, Ordering::SeqCst);
        store
    }

    pub fn add_item(
        &self,
        user_id: Uuid,
        email: &str,
        name: &str,
        expiry_date: Option<NaiveDate>,
    ) -> Uuid {
        self.add_row(ReminderCandidate {
            item_id: Uuid::new_v4(),
            name: name.to_string(),
            category: "Dairy".to_string(),
            purchase_date: None,
            shelf_life_days: None,
            expiry_date,
            user_id,
            email: email.to_string(),
        })
    }

    pub fn add_row(&self, row: ReminderCandidate) -> Uuid {
        let id = row.item_id;
        self.rows.lock().unwrap().push(row);
        id
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn read(&self) -> CoreResult<Vec<ReminderCandidate>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(GrocifyError::DatabaseError {
                operation: "fetch_reminder_candidates".to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(self.rows.lock().unwrap().clone())
    }
}

#[async_trait]
impl ReminderStore for InMemoryStore {
    async fn fetch_reminder_candidates(&self) -> CoreResult<Vec<ReminderCandidate>> {
        self.read()
    }

    async fn fetch_reminder_candidates_for_user(
        &self,
        user_id: Uuid,
    ) -> CoreResult<Vec<ReminderCandidate>> {
        Ok(self
            .read()?
            .into_iter()
            .filter(|row| row.user_id == user_id)
            .collect())
    }

    async fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}

/// Records every message instead of sending it
#[derive(Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<(String, EmailMessage)>>,
    failing: Mutex<HashSet<String>>,
    hanging: Mutex<HashSet<String>>,
    delay: Mutex<Option<Duration>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends to this address return an error
    pub fn fail_for(&self, email: &str) {
        self.failing.lock().unwrap().insert(email.to_string());
    }

    /// Sends to this address never complete
    pub fn hang_for(&self, email: &str) {
        self.hanging.lock().unwrap().insert(email.to_string());
    }

    /// Every send sleeps this long before recording
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn sent(&self) -> Vec<(String, EmailMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn message_for(&self, email: &str) -> Option<EmailMessage> {
        self.sent()
            .into_iter()
            .find(|(to, _)| to == email)
            .map(|(_, message)| message)
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn send(&self, to: &str, message: &EmailMessage) -> Result<(), EmailError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let hangs = self.hanging.lock().unwrap().contains(to);
        if hangs {
            std::future::pending::<()>().await;
        }

        let fails = self.failing.lock().unwrap().contains(to);
        if fails {
            return Err(EmailError::SendFailed(format!("mailbox {} unavailable", to)));
        }

        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), message.clone()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Canned recipe answers
pub struct FakeRecipeSource {
    recipes: Vec<Recipe>,
    fail: bool,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeRecipeSource {
    pub fn with_titles(titles: &[&str]) -> Self {
        Self {
            recipes: titles
                .iter()
                .enumerate()
                .map(|(i, title)| Recipe {
                    id: format!("recipe-{}", i),
                    title: title.to_string(),
                    short_description: format!("Uses up leftovers for {}", title),
                    instructions: "1. Cook".to_string(),
                })
                .collect(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            recipes: Vec::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecipeSource for FakeRecipeSource {
    async fn suggest(&self, ingredients: &[String]) -> Result<Vec<Recipe>, RecipeError> {
        self.calls.lock().unwrap().push(ingredients.to_vec());
        if self.fail {
            return Err(RecipeError::Service {
                status: 503,
                detail: "model not loaded".to_string(),
            });
        }
        Ok(self.recipes.clone())
    }
}

pub fn templates() -> TemplateEngine {
    TemplateEngine::new("http://localhost:5173".to_string(), "Grocify".to_string())
}

pub fn sweep_with(
    store: Arc<InMemoryStore>,
    dispatcher: Arc<RecordingDispatcher>,
    config: &ReminderConfig,
) -> ExpirySweep {
    ExpirySweep::new(
        store,
        dispatcher,
        Arc::new(FixedClock::new(today())),
        templates(),
        config,
    )
}
