// ABOUTME: Main library entry point for the marketplace back-office core
// ABOUTME: Dashboard metrics registry and category hierarchy manager with their ambient stack
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![deny(unsafe_code)]

//! # Marketplace Admin
//!
//! The administrative back-office layer of a marketplace: a dashboard of
//! memoized, time-ranged statistics whose composition depends on which
//! optional subsystems are active, and a category hierarchy manager that keeps
//! the category forest free of cycles.
//!
//! ## Architecture
//!
//! - **Metrics**: stats composed by subsystem contributors, evaluated through a
//!   single-flight TTL cache keyed by `(stat, range)`
//! - **Hierarchy**: validated create, update, delete and reorder of categories
//! - **Database**: storage traits with a SQLite implementation on `sqlx`
//! - **Mailout** and **Settings**: supporting back-office tools
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use marketplace_admin::cache::factory::Cache;
//! use marketplace_admin::config::AdminConfig;
//! use marketplace_admin::database::AdminDatabase;
//! use marketplace_admin::errors::AppResult;
//! use marketplace_admin::metrics::{Dashboard, TimeRange};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = AdminConfig::from_env()?;
//!     let database = Arc::new(AdminDatabase::new(&config.database_url).await?);
//!     let cache = Cache::new(config.cache_config()).await?;
//!
//!     let dashboard = Dashboard::from_config(&config, database, cache);
//!     let snapshot = dashboard.render(&TimeRange::standard_local()).await?;
//!     for (group, stat, value) in snapshot.triples("Today") {
//!         println!("{group} / {stat}: {value}");
//!     }
//!     Ok(())
//! }
//! ```

/// Memoization cache with single-flight lookup-or-compute
pub mod cache;

/// Environment configuration
pub mod config;

/// Application constants grouped by domain
pub mod constants;

/// Storage traits and the SQLite implementation
pub mod database;

/// Unified error handling
pub mod errors;

/// Number and currency display formatting
pub mod formatters;

/// Category hierarchy manager
pub mod hierarchy;

/// Structured logging setup
pub mod logging;

/// Bulk email to selected users
pub mod mailout;

/// Dashboard statistics
pub mod metrics;

/// Domain models
pub mod models;

/// Flattened configuration view
pub mod settings;

/// Optional marketplace subsystems
pub mod subsystems;
