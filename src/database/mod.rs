// ABOUTME: Storage abstraction for the back-office core
// ABOUTME: Category, aggregate-stat, and user-directory traits with a SQLite implementation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Storage collaborators
//!
//! The hierarchy manager, the metrics registry and the mailout tool only talk
//! to storage through these traits. [`sqlite::AdminDatabase`] implements all of
//! them on `sqlx`.

pub mod sqlite;

pub use sqlite::AdminDatabase;

use crate::errors::AppResult;
use crate::hierarchy::ChildPolicy;
use crate::models::{Category, CategoryId, CategorySummary, CategoryUpdate, NewCategory, User};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Persisted category set
///
/// Every mutating method applies its change as one atomic unit: either the
/// whole change is committed or nothing is.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Look up one category
    async fn find_category(&self, id: CategoryId) -> AppResult<Option<Category>>;

    /// Every category, ordered by id
    async fn all_categories(&self) -> AppResult<Vec<Category>>;

    /// Live count of items assigned to the category
    async fn count_items_in_category(&self, id: CategoryId) -> AppResult<i64>;

    /// Every category with its item count, ordered by `(sort, id)`
    async fn categories_with_item_counts(&self) -> AppResult<Vec<CategorySummary>>;

    /// Insert a new leaf with the default sort value
    async fn insert_category(&self, category: &NewCategory) -> AppResult<Category>;

    /// Rename, reslug and reparent in one transaction
    ///
    /// Implementations re-walk the ancestor chain of the new parent before
    /// committing and fail with `HierarchyCycle` if it reaches `update.id`.
    async fn update_category(&self, update: &CategoryUpdate) -> AppResult<Category>;

    /// Delete a category with no items, applying `policy` to its children
    ///
    /// Fails with `ResourceInUse` if items reference it at commit time.
    async fn delete_category(&self, id: CategoryId, policy: ChildPolicy) -> AppResult<()>;

    /// Set sort values in bulk; an unknown id aborts the whole batch
    async fn apply_sort(&self, sorts: &[(CategoryId, i64)]) -> AppResult<()>;
}

/// Aggregate queries backing the dashboard stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    /// Items listed since the lower bound
    ItemsListed,
    /// Watch-list additions since the lower bound
    ItemsWatched,
    /// Users registered since the lower bound
    UsersRegistered,
    /// Distinct users who listed items since the lower bound
    Sellers,
    /// Distinct users who bid since the lower bound
    Bidders,
    /// Bids placed since the lower bound
    BidsPlaced,
    /// Mean bid amount since the lower bound
    AverageBidAmount,
    /// Distinct users who purchased since the lower bound
    Buyers,
    /// Purchases made since the lower bound
    PurchasesCreated,
    /// Mean purchase amount since the lower bound
    AveragePurchaseAmount,
}

/// Read-only aggregate access, parameterized by a lower-bound timestamp
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Evaluate `aggregate` over rows created at or after `since` (epoch seconds)
    async fn aggregate(&self, aggregate: Aggregate, since: i64) -> AppResult<f64>;
}

/// User listing for the mailout tool
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Every user, ordered by username ascending
    async fn users_by_username(&self) -> AppResult<Vec<User>>;
}
