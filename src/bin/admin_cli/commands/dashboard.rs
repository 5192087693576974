// ABOUTME: Dashboard command for the marketplace admin CLI
// ABOUTME: Composes the stat registry from active subsystems and renders the standard ranges
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use marketplace_admin::{
    cache::factory::Cache,
    config::AdminConfig,
    database::AdminDatabase,
    errors::{AppError, AppResult},
    metrics::{Dashboard, TimeRange},
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::helpers::display::print_json;

/// Render the dashboard as JSON
///
/// With `range`, only that column is printed as `(group, stat, value)` rows.
pub async fn show(
    config: &AdminConfig,
    database: Arc<AdminDatabase>,
    partial: bool,
    range: Option<&str>,
) -> AppResult<()> {
    let ranges = TimeRange::standard_local();
    if let Some(label) = range {
        if !ranges.iter().any(|r| r.label == label) {
            let known: Vec<&str> = ranges.iter().map(|r| r.label.as_str()).collect();
            return Err(AppError::invalid_input(format!(
                "Unknown range '{label}', expected one of: {}",
                known.join(", ")
            )));
        }
    }

    let cache = Cache::new(config.cache_config()).await?;
    let dashboard = Dashboard::from_config(config, database, cache);
    info!(stats = dashboard.registry().len(), "Rendering dashboard");

    let snapshot = if partial {
        let snapshot = dashboard.render_partial(&ranges).await;
        let failures = snapshot.failure_count();
        if failures > 0 {
            warn!(failures, "Dashboard rendered with failed stats");
        }
        snapshot
    } else {
        dashboard.render(&ranges).await?
    };

    match range {
        Some(label) => print_json(&snapshot.triples(label)),
        None => print_json(&snapshot),
    }
}
