//! Grocery items tracked per user

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A grocery item owned by exactly one user
///
/// At least one of `expiry_date` or (`purchase_date` + `shelf_life_days`)
/// must be present for the item to take part in expiry reminders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub category: String,
    pub purchase_date: Option<NaiveDate>,
    /// Days the item stays usable after `purchase_date`
    pub shelf_life_days: Option<i32>,
    pub expiry_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of an item taken when it was deleted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ArchivedItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub category: String,
    pub purchase_date: Option<NaiveDate>,
    pub shelf_life_days: Option<i32>,
    pub expiry_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub archived_at: DateTime<Utc>,
}

/// Input for adding an item to a user's inventory
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(range(min = 0))]
    pub quantity: i32,

    #[validate(length(min = 1, max = 100))]
    pub category: String,

    pub purchase_date: Option<NaiveDate>,

    #[validate(range(min = 0, max = 3650))]
    pub shelf_life_days: Option<i32>,

    pub expiry_date: Option<NaiveDate>,
}
