// ABOUTME: SQLite storage implementation on sqlx for categories, aggregates and users
// ABOUTME: Transactional hierarchy writes with a commit-time cycle re-check
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{Aggregate, CategoryStore, StatsStore, UserDirectory};
use crate::constants::{fields, messages};
use crate::errors::{AppError, AppResult};
use crate::hierarchy::ChildPolicy;
use crate::models::{
    Category, CategoryId, CategorySummary, CategoryUpdate, NewCategory, User, UserId,
};
use async_trait::async_trait;
use chrono::DateTime;
use serde_json::json;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, Transaction};
use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Schema statements, applied in order by [`AdminDatabase::migrate`]
const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        parent_id INTEGER,
        name TEXT NOT NULL,
        slug TEXT NOT NULL,
        sort INTEGER NOT NULL DEFAULT 0
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_categories_parent ON categories(parent_id)",
    r"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL,
        joined INTEGER NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        seller_id INTEGER NOT NULL,
        category_id INTEGER,
        name TEXT NOT NULL,
        created INTEGER NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_items_category ON items(category_id)",
    "CREATE INDEX IF NOT EXISTS idx_items_created ON items(created)",
    r"
    CREATE TABLE IF NOT EXISTS watched_items (
        user_id INTEGER NOT NULL,
        item_id INTEGER NOT NULL,
        added INTEGER NOT NULL,
        PRIMARY KEY (user_id, item_id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS bids (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        item_id INTEGER NOT NULL,
        bidder_id INTEGER NOT NULL,
        amount REAL NOT NULL,
        placed INTEGER NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS purchases (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        item_id INTEGER NOT NULL,
        buyer_id INTEGER NOT NULL,
        amount REAL NOT NULL,
        created INTEGER NOT NULL
    )
    ",
];

impl Aggregate {
    /// Query computing this aggregate; `$1` is the lower bound
    const fn sql(self) -> &'static str {
        match self {
            Self::ItemsListed => "SELECT CAST(COUNT(*) AS REAL) FROM items WHERE created >= $1",
            Self::ItemsWatched => {
                "SELECT CAST(COUNT(*) AS REAL) FROM watched_items WHERE added >= $1"
            }
            Self::UsersRegistered => "SELECT CAST(COUNT(*) AS REAL) FROM users WHERE joined >= $1",
            Self::Sellers => {
                "SELECT CAST(COUNT(DISTINCT seller_id) AS REAL) FROM items WHERE created >= $1"
            }
            Self::Bidders => {
                "SELECT CAST(COUNT(DISTINCT bidder_id) AS REAL) FROM bids WHERE placed >= $1"
            }
            Self::BidsPlaced => "SELECT CAST(COUNT(*) AS REAL) FROM bids WHERE placed >= $1",
            Self::AverageBidAmount => {
                "SELECT CAST(COALESCE(AVG(amount), 0) AS REAL) FROM bids WHERE placed >= $1"
            }
            Self::Buyers => {
                "SELECT CAST(COUNT(DISTINCT buyer_id) AS REAL) FROM purchases WHERE created >= $1"
            }
            Self::PurchasesCreated => {
                "SELECT CAST(COUNT(*) AS REAL) FROM purchases WHERE created >= $1"
            }
            Self::AveragePurchaseAmount => {
                "SELECT CAST(COALESCE(AVG(amount), 0) AS REAL) FROM purchases WHERE created >= $1"
            }
        }
    }
}

/// SQLite-backed storage for every back-office collaborator trait
#[derive(Clone)]
pub struct AdminDatabase {
    pool: SqlitePool,
}

impl AdminDatabase {
    /// Connect and run migrations
    ///
    /// In-memory URLs (`sqlite::memory:`) are pinned to a single connection
    /// that never idles out, since every new connection would otherwise see
    /// its own empty database.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the database cannot be opened or migrated
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(options).await?;

        let database = Self { pool };
        database.migrate().await?;
        info!("Connected to database: {}", database_url);
        Ok(database)
    }

    /// Underlying pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and indexes if they do not exist
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if a statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        for &statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("Schema migrations applied");
        Ok(())
    }

    /// Register a user, returning its id
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` on query failure (including duplicate usernames)
    pub async fn insert_user(&self, username: &str, email: &str, joined: i64) -> AppResult<UserId> {
        let result = sqlx::query("INSERT INTO users (username, email, joined) VALUES ($1, $2, $3)")
            .bind(username)
            .bind(email)
            .bind(joined)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// List an item, returning its id
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` on query failure
    pub async fn insert_item(
        &self,
        seller_id: UserId,
        category_id: Option<CategoryId>,
        name: &str,
        created: i64,
    ) -> AppResult<i64> {
        let result = sqlx::query(
            "INSERT INTO items (seller_id, category_id, name, created) VALUES ($1, $2, $3, $4)",
        )
        .bind(seller_id)
        .bind(category_id)
        .bind(name)
        .bind(created)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Add an item to a user's watch list
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` on query failure
    pub async fn watch_item(&self, user_id: UserId, item_id: i64, added: i64) -> AppResult<()> {
        sqlx::query("INSERT INTO watched_items (user_id, item_id, added) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(item_id)
            .bind(added)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Record a bid
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` on query failure
    pub async fn place_bid(
        &self,
        item_id: i64,
        bidder_id: UserId,
        amount: f64,
        placed: i64,
    ) -> AppResult<()> {
        sqlx::query("INSERT INTO bids (item_id, bidder_id, amount, placed) VALUES ($1, $2, $3, $4)")
            .bind(item_id)
            .bind(bidder_id)
            .bind(amount)
            .bind(placed)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Record a completed purchase
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` on query failure
    pub async fn record_purchase(
        &self,
        item_id: i64,
        buyer_id: UserId,
        amount: f64,
        created: i64,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO purchases (item_id, buyer_id, amount, created) VALUES ($1, $2, $3, $4)",
        )
        .bind(item_id)
        .bind(buyer_id)
        .bind(amount)
        .bind(created)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fail with `HierarchyCycle` if walking up from `parent_id` reaches `id`
    async fn verify_ancestor_chain(
        tx: &mut Transaction<'_, Sqlite>,
        id: CategoryId,
        parent_id: CategoryId,
    ) -> AppResult<()> {
        let mut visited = HashSet::new();
        let mut current = Some(parent_id);

        while let Some(node) = current {
            if node == id {
                return Err(AppError::cycle(
                    fields::PARENT_CATEGORY_ID,
                    messages::CATEGORY_PARENT_IS_CHILD,
                ));
            }
            // A pre-existing loop above us cannot reach `id`, stop walking it
            if !visited.insert(node) {
                break;
            }

            let parent: Option<Option<CategoryId>> =
                sqlx::query_scalar("SELECT parent_id FROM categories WHERE id = $1")
                    .bind(node)
                    .fetch_optional(&mut **tx)
                    .await?;

            current = match parent {
                Some(next) => next,
                None if node == parent_id => {
                    return Err(AppError::validation(
                        fields::PARENT_CATEGORY_ID,
                        messages::CATEGORY_NOT_FOUND,
                    ));
                }
                None => None,
            };
        }

        Ok(())
    }
}

fn row_to_category(row: &SqliteRow) -> AppResult<Category> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        parent_id: row.try_get("parent_id")?,
        sort: row.try_get("sort")?,
    })
}

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let joined: i64 = row.try_get("joined")?;
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        joined: DateTime::from_timestamp(joined, 0)
            .ok_or_else(|| AppError::internal(format!("Invalid join timestamp {joined}")))?,
    })
}

#[async_trait]
impl CategoryStore for AdminDatabase {
    async fn find_category(&self, id: CategoryId) -> AppResult<Option<Category>> {
        let row = sqlx::query("SELECT id, name, slug, parent_id, sort FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_category(&r)).transpose()
    }

    async fn all_categories(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, slug, parent_id, sort FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_category).collect()
    }

    async fn count_items_in_category(&self, id: CategoryId) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE category_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn categories_with_item_counts(&self) -> AppResult<Vec<CategorySummary>> {
        let rows = sqlx::query(
            r"
            SELECT c.id, c.name, c.slug, c.parent_id, c.sort, COUNT(i.id) AS item_count
            FROM categories c
            LEFT JOIN items i ON i.category_id = c.id
            GROUP BY c.id
            ORDER BY c.sort ASC, c.id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(CategorySummary {
                    category: row_to_category(row)?,
                    item_count: row.try_get("item_count")?,
                })
            })
            .collect()
    }

    async fn insert_category(&self, category: &NewCategory) -> AppResult<Category> {
        let result =
            sqlx::query("INSERT INTO categories (parent_id, name, slug, sort) VALUES ($1, $2, $3, 0)")
                .bind(category.parent_id)
                .bind(&category.name)
                .bind(&category.slug)
                .execute(&self.pool)
                .await?;

        Ok(Category {
            id: result.last_insert_rowid(),
            name: category.name.clone(),
            slug: category.slug.clone(),
            parent_id: category.parent_id,
            sort: 0,
        })
    }

    async fn update_category(&self, update: &CategoryUpdate) -> AppResult<Category> {
        let mut tx = self.pool.begin().await?;

        // Writing first takes the write lock, so the re-check below reads a
        // tree no other writer can change before we commit
        let result =
            sqlx::query("UPDATE categories SET name = $1, slug = $2, parent_id = $3 WHERE id = $4")
                .bind(&update.name)
                .bind(&update.slug)
                .bind(update.parent_id)
                .bind(update.id)
                .execute(&mut *tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::validation(
                fields::CATEGORY_ID,
                messages::CATEGORY_NOT_FOUND,
            ));
        }

        if let Some(parent_id) = update.parent_id {
            Self::verify_ancestor_chain(&mut tx, update.id, parent_id).await?;
        }

        let row = sqlx::query("SELECT id, name, slug, parent_id, sort FROM categories WHERE id = $1")
            .bind(update.id)
            .fetch_one(&mut *tx)
            .await?;
        let category = row_to_category(&row)?;

        tx.commit().await?;
        Ok(category)
    }

    async fn delete_category(&self, id: CategoryId, policy: ChildPolicy) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let item_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE category_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if item_count > 0 {
            return Err(AppError::in_use(fields::CATEGORY_ID, messages::CATEGORY_HAS_ITEMS));
        }

        match policy {
            ChildPolicy::Reject => {
                let child_count: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE parent_id = $1")
                        .bind(id)
                        .fetch_one(&mut *tx)
                        .await?;
                if child_count > 0 {
                    return Err(AppError::in_use(
                        fields::CATEGORY_ID,
                        messages::CATEGORY_HAS_CHILDREN,
                    ));
                }
            }
            ChildPolicy::OrphanToRoot => {
                let orphaned = sqlx::query("UPDATE categories SET parent_id = NULL WHERE parent_id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();
                if orphaned > 0 {
                    debug!(category.id = id, orphaned, "Promoted subcategories to roots");
                }
            }
        }

        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(AppError::validation(
                fields::CATEGORY_ID,
                messages::CATEGORY_NOT_FOUND,
            ));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn apply_sort(&self, sorts: &[(CategoryId, i64)]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        for &(id, sort) in sorts {
            let updated = sqlx::query("UPDATE categories SET sort = $1 WHERE id = $2")
                .bind(sort)
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

            // Dropping the transaction rolls back the rows already written
            if updated == 0 {
                return Err(AppError::validation(
                    fields::CATEGORIES,
                    format!("Category {id} does not exist"),
                )
                .with_resource_id(id.to_string())
                .with_details(json!({ "unknown_category_id": id })));
            }
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl StatsStore for AdminDatabase {
    async fn aggregate(&self, aggregate: Aggregate, since: i64) -> AppResult<f64> {
        let value = sqlx::query_scalar(aggregate.sql())
            .bind(since)
            .fetch_one(&self.pool)
            .await?;
        Ok(value)
    }
}

#[async_trait]
impl UserDirectory for AdminDatabase {
    async fn users_by_username(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query("SELECT id, username, email, joined FROM users ORDER BY username ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_user).collect()
    }
}
