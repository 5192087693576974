// ABOUTME: Category management commands for the marketplace admin CLI
// ABOUTME: Handles list, create, update, delete and sort through the hierarchy manager
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use marketplace_admin::{
    config::AdminConfig,
    constants::{fields, messages},
    database::AdminDatabase,
    errors::{AppError, AppResult},
    hierarchy::CategoryHierarchy,
    models::{CategoryId, CategoryUpdate, NewCategory},
};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::helpers::display::{print_json, print_outcome};

fn hierarchy(config: &AdminConfig, database: Arc<AdminDatabase>) -> CategoryHierarchy {
    CategoryHierarchy::new(database, config.categories.delete_policy)
}

/// List categories with item counts
pub async fn list(config: &AdminConfig, database: Arc<AdminDatabase>) -> AppResult<()> {
    let categories = hierarchy(config, database).list_categories().await?;
    print_json(&categories)
}

/// Create a category
pub async fn create(
    config: &AdminConfig,
    database: Arc<AdminDatabase>,
    name: String,
    slug: String,
    parent_id: Option<CategoryId>,
) -> AppResult<()> {
    let category = hierarchy(config, database)
        .create_category(NewCategory {
            name,
            slug,
            parent_id,
        })
        .await?;
    print_outcome(messages::CATEGORY_CREATED, Some(&category))
}

/// Rename, reslug and reparent a category
pub async fn update(
    config: &AdminConfig,
    database: Arc<AdminDatabase>,
    id: CategoryId,
    name: String,
    slug: String,
    parent_id: Option<CategoryId>,
) -> AppResult<()> {
    let category = hierarchy(config, database)
        .update_category(CategoryUpdate {
            id,
            name,
            slug,
            parent_id,
        })
        .await?;
    print_outcome(messages::CATEGORY_UPDATED, Some(&category))
}

/// Delete a category
pub async fn delete(
    config: &AdminConfig,
    database: Arc<AdminDatabase>,
    id: CategoryId,
) -> AppResult<()> {
    hierarchy(config, database).delete_category(id).await?;
    print_outcome::<()>(messages::CATEGORY_DELETED, None)
}

/// Apply `id=sort` pairs in one batch
pub async fn sort(
    config: &AdminConfig,
    database: Arc<AdminDatabase>,
    entries: &[String],
) -> AppResult<()> {
    let sorts = parse_sort_entries(entries)?;
    hierarchy(config, database).sort_categories(&sorts).await?;
    print_outcome::<()>(messages::CATEGORIES_SORTED, None)
}

fn parse_sort_entries(entries: &[String]) -> AppResult<BTreeMap<CategoryId, i64>> {
    entries
        .iter()
        .map(|entry| {
            let (id, sort) = entry.split_once('=').ok_or_else(|| {
                AppError::validation(
                    fields::CATEGORIES,
                    format!("Expected id=sort, got '{entry}'"),
                )
            })?;
            let parse = |value: &str| {
                value.trim().parse::<i64>().map_err(|e| {
                    AppError::validation(fields::CATEGORIES, format!("Invalid '{entry}': {e}"))
                })
            };
            Ok((parse(id)?, parse(sort)?))
        })
        .collect()
}
