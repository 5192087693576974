// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, in-memory databases, caches and marketplace fixtures
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `marketplace_admin`

use anyhow::Result;
use marketplace_admin::{
    cache::{factory::Cache, CacheConfig},
    database::AdminDatabase,
    hierarchy::{CategoryHierarchy, ChildPolicy},
    models::{Category, CategoryId, NewCategory},
};
use std::sync::{Arc, Once};
use std::time::Duration;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Arc<AdminDatabase>> {
    init_test_logging();
    let database = Arc::new(AdminDatabase::new("sqlite::memory:").await?);
    Ok(database)
}

/// In-memory cache without the background cleanup task
pub async fn create_test_cache() -> Result<Cache> {
    let config = CacheConfig {
        max_entries: 1000,
        cleanup_interval: Duration::from_secs(60),
        enable_background_cleanup: false,
    };
    Ok(Cache::new(config).await?)
}

/// Hierarchy manager over a fresh database
pub async fn create_test_hierarchy(
    policy: ChildPolicy,
) -> Result<(Arc<AdminDatabase>, CategoryHierarchy)> {
    let database = create_test_database().await?;
    let hierarchy = CategoryHierarchy::new(database.clone(), policy);
    Ok((database, hierarchy))
}

/// Create a category named after its slug
pub async fn create_category(
    hierarchy: &CategoryHierarchy,
    slug: &str,
    parent_id: Option<CategoryId>,
) -> Result<Category> {
    let request = NewCategory {
        name: slug.to_uppercase(),
        slug: slug.to_owned(),
        parent_id,
    };
    Ok(hierarchy.create_category(request).await?)
}

/// Snapshot of `(id, parent_id)` pairs, ordered by id
pub async fn parent_links(hierarchy: &CategoryHierarchy) -> Result<Vec<(i64, Option<i64>)>> {
    let mut links: Vec<(i64, Option<i64>)> = hierarchy
        .list_categories()
        .await?
        .into_iter()
        .map(|summary| (summary.category.id, summary.category.parent_id))
        .collect();
    links.sort_unstable();
    Ok(links)
}

/// Register a seller and list one item in `category_id`
pub async fn list_item(
    database: &AdminDatabase,
    username: &str,
    category_id: Option<CategoryId>,
    created: i64,
) -> Result<i64> {
    let seller = database
        .insert_user(username, &format!("{username}@example.com"), created)
        .await?;
    Ok(database
        .insert_item(seller, category_id, &format!("{username}'s item"), created)
        .await?)
}
