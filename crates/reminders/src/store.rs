//! Item and user persistence
//!
//! Two seams live here. [`ReminderStore`] is the read-only boundary the
//! expiry sweep consumes. [`InventoryRepository`] covers the CRUD surface
//! around it, including archival of deleted items. [`PostgresStore`]
//! implements both.

use async_trait::async_trait;
use chrono::NaiveDate;
use grocify_core::telemetry::db_query_span;
use grocify_core::{
    ArchivedItem, CreateItemRequest, CreateUserRequest, GrocifyError, Item, Result, User,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, info, Instrument};
use uuid::Uuid;
use validator::Validate;

/// One active item joined with its owner's email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReminderCandidate {
    pub item_id: Uuid,
    pub name: String,
    pub category: String,
    pub purchase_date: Option<NaiveDate>,
    pub shelf_life_days: Option<i32>,
    pub expiry_date: Option<NaiveDate>,
    pub user_id: Uuid,
    pub email: String,
}

/// Read boundary used by the expiry sweep
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Every non-archived item with its owner's email
    async fn fetch_reminder_candidates(&self) -> Result<Vec<ReminderCandidate>>;

    /// Non-archived items of a single owner
    async fn fetch_reminder_candidates_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ReminderCandidate>>;

    /// Whether the backing store is reachable
    async fn is_healthy(&self) -> bool;
}

/// User and item CRUD with archival on delete
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn create_user(&self, request: &CreateUserRequest) -> Result<User>;
    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>>;
    async fn create_item(&self, user_id: Uuid, request: &CreateItemRequest) -> Result<Item>;
    async fn list_items(&self, user_id: Uuid) -> Result<Vec<Item>>;

    /// Copy the item into the archive and remove it from the active set
    async fn delete_item(&self, user_id: Uuid, item_id: Uuid) -> Result<ArchivedItem>;

    async fn list_archived_items(&self, user_id: Uuid) -> Result<Vec<ArchivedItem>>;
}

const CANDIDATE_COLUMNS: &str = r#"
    i.id AS item_id,
    i.name,
    i.category,
    i.purchase_date,
    i.shelf_life_days,
    i.expiry_date,
    u.id AS user_id,
    u.email
"#;

const ITEM_COLUMNS: &str = "id, user_id, name, quantity, category, purchase_date, shelf_life_days, expiry_date, created_at";

/// PostgreSQL implementation of both store traits
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes if they don't exist
    pub async fn initialize_schema(&self) -> Result<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name VARCHAR(100) NOT NULL,
                email VARCHAR(255) NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name VARCHAR(200) NOT NULL,
                quantity INTEGER NOT NULL DEFAULT 1,
                category VARCHAR(100) NOT NULL,
                purchase_date DATE,
                shelf_life_days INTEGER,
                expiry_date DATE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS archived_items (
                id UUID PRIMARY KEY,
                user_id UUID NOT NULL,
                name VARCHAR(200) NOT NULL,
                quantity INTEGER NOT NULL,
                category VARCHAR(100) NOT NULL,
                purchase_date DATE,
                shelf_life_days INTEGER,
                expiry_date DATE,
                created_at TIMESTAMPTZ NOT NULL,
                archived_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_items_user ON items(user_id)",
            "CREATE INDEX IF NOT EXISTS idx_archived_items_user ON archived_items(user_id, archived_at DESC)",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| GrocifyError::database("initialize_schema", e))?;
        }

        info!("Inventory schema initialized");
        Ok(())
    }
}

#[async_trait]
impl ReminderStore for PostgresStore {
    async fn fetch_reminder_candidates(&self) -> Result<Vec<ReminderCandidate>> {
        let query = format!(
            "SELECT {} FROM items i JOIN users u ON u.id = i.user_id",
            CANDIDATE_COLUMNS
        );

        let candidates = sqlx::query_as::<_, ReminderCandidate>(&query)
            .fetch_all(&self.pool)
            .instrument(db_query_span("SELECT", "items"))
            .await
            .map_err(|e| GrocifyError::database("fetch_reminder_candidates", e))?;

        debug!(count = candidates.len(), "Loaded reminder candidates");
        Ok(candidates)
    }

    async fn fetch_reminder_candidates_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ReminderCandidate>> {
        let query = format!(
            "SELECT {} FROM items i JOIN users u ON u.id = i.user_id WHERE u.id = $1",
            CANDIDATE_COLUMNS
        );

        sqlx::query_as::<_, ReminderCandidate>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .instrument(db_query_span("SELECT", "items"))
            .await
            .map_err(|e| GrocifyError::database("fetch_reminder_candidates_for_user", e))
    }

    async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }
}

#[async_trait]
impl InventoryRepository for PostgresStore {
    async fn create_user(&self, request: &CreateUserRequest) -> Result<User> {
        request.validate()?;

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(&request.name)
        .bind(request.email.to_lowercase())
        .bind(&request.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return GrocifyError::validation("email", "email already registered");
                }
            }
            GrocifyError::database("create_user", e)
        })
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GrocifyError::database("find_user", e))
    }

    async fn create_item(&self, user_id: Uuid, request: &CreateItemRequest) -> Result<Item> {
        request.validate()?;

        let query = format!(
            r#"
            INSERT INTO items (user_id, name, quantity, category, purchase_date, shelf_life_days, expiry_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        );

        sqlx::query_as::<_, Item>(&query)
            .bind(user_id)
            .bind(&request.name)
            .bind(request.quantity)
            .bind(&request.category)
            .bind(request.purchase_date)
            .bind(request.shelf_life_days)
            .bind(request.expiry_date)
            .fetch_one(&self.pool)
            .instrument(db_query_span("INSERT", "items"))
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return GrocifyError::not_found("user", user_id);
                    }
                }
                GrocifyError::database("create_item", e)
            })
    }

    async fn list_items(&self, user_id: Uuid) -> Result<Vec<Item>> {
        let query = format!(
            "SELECT {} FROM items WHERE user_id = $1 ORDER BY created_at DESC",
            ITEM_COLUMNS
        );

        sqlx::query_as::<_, Item>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| GrocifyError::database("list_items", e))
    }

    async fn delete_item(&self, user_id: Uuid, item_id: Uuid) -> Result<ArchivedItem> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| GrocifyError::database("delete_item", e))?;

        let archived = sqlx::query_as::<_, ArchivedItem>(
            r#"
            INSERT INTO archived_items (
                id, user_id, name, quantity, category,
                purchase_date, shelf_life_days, expiry_date, created_at
            )
            SELECT id, user_id, name, quantity, category,
                   purchase_date, shelf_life_days, expiry_date, created_at
            FROM items
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, quantity, category,
                      purchase_date, shelf_life_days, expiry_date, created_at, archived_at
            "#,
        )
        .bind(item_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| GrocifyError::database("archive_item", e))?
        .ok_or_else(|| GrocifyError::not_found("item", item_id))?;

        sqlx::query("DELETE FROM items WHERE id = $1 AND user_id = $2")
            .bind(item_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| GrocifyError::database("delete_item", e))?;

        tx.commit()
            .await
            .map_err(|e| GrocifyError::database("delete_item", e))?;

        info!(item_id = %item_id, user_id = %user_id, "Archived and deleted item");
        Ok(archived)
    }

    async fn list_archived_items(&self, user_id: Uuid) -> Result<Vec<ArchivedItem>> {
        sqlx::query_as::<_, ArchivedItem>(
            r#"
            SELECT id, user_id, name, quantity, category,
                   purchase_date, shelf_life_days, expiry_date, created_at, archived_at
            FROM archived_items
            WHERE user_id = $1
            ORDER BY archived_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GrocifyError::database("list_archived_items", e))
    }
}
