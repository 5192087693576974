// ABOUTME: Category hierarchy manager enforcing forest invariants on every mutation
// ABOUTME: Cycle-safe reparenting, item-count deletion guards, child policies and bulk ordering
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Category hierarchy
//!
//! [`CategoryHierarchy`] validates create, update, delete and reorder requests
//! against the persisted category forest and applies each one as a single
//! atomic unit through a [`CategoryStore`]. Rejections are field-addressable
//! [`AppError`]s; a rejected mutation never leaves a partial write behind.
//!
//! Mutations are serialized within the process by an async lock. The SQLite
//! store additionally re-walks the ancestor chain inside its write
//! transaction, so two processes racing to reparent cannot both commit a
//! cycle.

pub mod descendants;

pub use descendants::{ancestor_chain_contains, descendant_ids};

use crate::constants::{fields, messages};
use crate::database::CategoryStore;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{Category, CategoryId, CategorySummary, CategoryUpdate, NewCategory};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

/// What happens to subcategories when their parent is deleted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildPolicy {
    /// Children become roots in the same transaction
    #[default]
    #[serde(rename = "orphan")]
    OrphanToRoot,
    /// Deletion is refused while children exist
    #[serde(rename = "reject")]
    Reject,
}

impl ChildPolicy {
    /// Configuration name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OrphanToRoot => "orphan",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for ChildPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChildPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "orphan" | "orphan_to_root" => Ok(Self::OrphanToRoot),
            "reject" => Ok(Self::Reject),
            _ => Err(AppError::invalid_config(
                "CATEGORY_DELETE_POLICY",
                s,
                "expected one of orphan, reject",
            )),
        }
    }
}

/// Validates and applies category mutations
pub struct CategoryHierarchy {
    store: Arc<dyn CategoryStore>,
    policy: ChildPolicy,
    mutation_lock: Mutex<()>,
}

impl CategoryHierarchy {
    /// Create a manager over `store`, deleting parents according to `policy`
    #[must_use]
    pub fn new(store: Arc<dyn CategoryStore>, policy: ChildPolicy) -> Self {
        Self {
            store,
            policy,
            mutation_lock: Mutex::new(()),
        }
    }

    /// Policy applied to children of deleted categories
    #[must_use]
    pub const fn child_policy(&self) -> ChildPolicy {
        self.policy
    }

    /// Create a new leaf category
    ///
    /// # Errors
    ///
    /// - `MissingRequiredField` if the name or slug is blank
    /// - `InvalidInput` on `parent_category_id` if the parent does not exist
    pub async fn create_category(&self, request: NewCategory) -> AppResult<Category> {
        let request = NewCategory {
            name: required(fields::NAME, &request.name)?,
            slug: required(fields::SLUG, &request.slug)?,
            parent_id: request.parent_id,
        };

        let _guard = self.mutation_lock.lock().await;

        let result = async {
            if let Some(parent_id) = request.parent_id {
                self.require_parent(parent_id).await?;
            }
            self.store.insert_category(&request).await
        }
        .await;

        AppLogger::log_category_mutation(
            "create",
            result.as_ref().ok().map(|category| category.id),
            result.is_ok(),
        );
        result
    }

    /// Rename, reslug and reparent a category atomically
    ///
    /// # Errors
    ///
    /// - `MissingRequiredField` if the name or slug is blank
    /// - `InvalidInput` if the category or the new parent does not exist
    /// - `HierarchyCycle` on `parent_category_id` if the new parent is the
    ///   category itself or one of its descendants
    pub async fn update_category(&self, update: CategoryUpdate) -> AppResult<Category> {
        let update = CategoryUpdate {
            id: update.id,
            name: required(fields::NAME, &update.name)?,
            slug: required(fields::SLUG, &update.slug)?,
            parent_id: update.parent_id,
        };

        let _guard = self.mutation_lock.lock().await;

        let result = async {
            self.require_category(update.id).await?;

            if let Some(parent_id) = update.parent_id {
                if parent_id == update.id {
                    return Err(parent_is_child());
                }
                self.require_parent(parent_id).await?;

                let categories = self.store.all_categories().await?;
                if descendant_ids(&categories, update.id).contains(&parent_id) {
                    return Err(parent_is_child());
                }
            }

            self.store.update_category(&update).await
        }
        .await;

        AppLogger::log_category_mutation("update", Some(update.id), result.is_ok());
        result
    }

    /// Delete a category that has no items
    ///
    /// Children are handled according to [`ChildPolicy`].
    ///
    /// # Errors
    ///
    /// - `InvalidInput` on `category_id` if the category does not exist
    /// - `ResourceInUse` on `category_id` if items reference it, or if it has
    ///   children under [`ChildPolicy::Reject`]
    pub async fn delete_category(&self, id: CategoryId) -> AppResult<()> {
        let _guard = self.mutation_lock.lock().await;

        let result = async {
            self.require_category(id).await?;

            if self.store.count_items_in_category(id).await? > 0 {
                return Err(AppError::in_use(
                    fields::CATEGORY_ID,
                    messages::CATEGORY_HAS_ITEMS,
                ));
            }

            self.store.delete_category(id, self.policy).await
        }
        .await;

        AppLogger::log_category_mutation("delete", Some(id), result.is_ok());
        result
    }

    /// Assign sort values in bulk
    ///
    /// All-or-nothing: if any id is unknown no sort value changes.
    ///
    /// # Errors
    ///
    /// - `MissingRequiredField` on `categories` if the mapping is empty
    /// - `InvalidInput` on `categories` if an id does not exist
    pub async fn sort_categories(&self, sorts: &BTreeMap<CategoryId, i64>) -> AppResult<()> {
        if sorts.is_empty() {
            return Err(AppError::missing_field(fields::CATEGORIES));
        }

        let sorts: Vec<(CategoryId, i64)> = sorts.iter().map(|(&id, &sort)| (id, sort)).collect();

        let _guard = self.mutation_lock.lock().await;
        let result = self.store.apply_sort(&sorts).await;

        AppLogger::log_category_mutation("sort", None, result.is_ok());
        result
    }

    /// Every category with its item count, ordered by `(sort, id)`
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the store fails
    pub async fn list_categories(&self) -> AppResult<Vec<CategorySummary>> {
        self.store.categories_with_item_counts().await
    }

    /// Look up one category
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the store fails
    pub async fn find_category(&self, id: CategoryId) -> AppResult<Option<Category>> {
        self.store.find_category(id).await
    }

    /// Ids of every category transitively beneath `id`
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the store fails
    pub async fn descendant_ids(&self, id: CategoryId) -> AppResult<HashSet<CategoryId>> {
        let categories = self.store.all_categories().await?;
        Ok(descendant_ids(&categories, id))
    }

    /// Whether `ancestor` appears on the parent chain above `id`
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the store fails
    pub async fn is_descendant_of(&self, id: CategoryId, ancestor: CategoryId) -> AppResult<bool> {
        if id == ancestor {
            return Ok(false);
        }
        let categories = self.store.all_categories().await?;
        Ok(ancestor_chain_contains(&categories, id, ancestor))
    }

    async fn require_category(&self, id: CategoryId) -> AppResult<Category> {
        self.store.find_category(id).await?.ok_or_else(|| {
            AppError::validation(fields::CATEGORY_ID, messages::CATEGORY_NOT_FOUND)
                .with_resource_id(id.to_string())
        })
    }

    async fn require_parent(&self, parent_id: CategoryId) -> AppResult<Category> {
        self.store.find_category(parent_id).await?.ok_or_else(|| {
            AppError::validation(fields::PARENT_CATEGORY_ID, messages::CATEGORY_NOT_FOUND)
                .with_resource_id(parent_id.to_string())
        })
    }
}

fn parent_is_child() -> AppError {
    AppError::cycle(fields::PARENT_CATEGORY_ID, messages::CATEGORY_PARENT_IS_CHILD)
}

/// Trimmed value, or `MissingRequiredField` if nothing is left
fn required(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::missing_field(field));
    }
    Ok(trimmed.to_owned())
}
