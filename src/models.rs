// ABOUTME: Domain models for the back-office core
// ABOUTME: Category tree nodes, mutation requests, and directory users
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category identifier
pub type CategoryId = i64;

/// User identifier
pub type UserId = i64;

/// A node in the category forest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Primary key
    pub id: CategoryId,
    /// Display name
    pub name: String,
    /// URL slug
    pub slug: String,
    /// Parent category, `None` for roots
    pub parent_id: Option<CategoryId>,
    /// Manual ordering, ascending
    pub sort: i64,
}

/// Request to create a category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCategory {
    /// Display name (required)
    pub name: String,
    /// URL slug (required)
    pub slug: String,
    /// Optional parent, must exist
    pub parent_id: Option<CategoryId>,
}

impl NewCategory {
    /// Root category request
    pub fn root(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            parent_id: None,
        }
    }

    /// Child category request
    pub fn child(name: impl Into<String>, slug: impl Into<String>, parent_id: CategoryId) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            parent_id: Some(parent_id),
        }
    }
}

/// Request to rename, reslug and reparent a category in one unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUpdate {
    /// Category being updated
    pub id: CategoryId,
    /// New display name (required)
    pub name: String,
    /// New URL slug (required)
    pub slug: String,
    /// New parent, `None` makes it a root
    pub parent_id: Option<CategoryId>,
}

/// Category together with its live item count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// The category
    #[serde(flatten)]
    pub category: Category,
    /// Items currently assigned to it
    pub item_count: i64,
}

/// Marketplace user as seen by the mailout tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Primary key
    pub id: UserId,
    /// Public handle
    pub username: String,
    /// Contact address
    pub email: String,
    /// Registration time
    pub joined: DateTime<Utc>,
}
