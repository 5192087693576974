// ABOUTME: Memoized stat evaluation keyed by stat slot and range lower bound
// ABOUTME: Single-flight lookup-or-compute through the shared cache, then display formatting
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::ranges::TimeRange;
use super::stat::Stat;
use crate::cache::{factory::Cache, CacheKey};
use crate::config::DashboardConfig;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use std::time::{Duration, Instant};

/// Evaluates stats through the process-wide cache
#[derive(Clone)]
pub struct StatEvaluator {
    cache: Cache,
    ttl: Duration,
    currency_symbol: String,
}

impl StatEvaluator {
    /// Evaluator memoizing results for `ttl`
    pub fn new(cache: Cache, ttl: Duration, currency_symbol: impl Into<String>) -> Self {
        Self {
            cache,
            ttl,
            currency_symbol: currency_symbol.into(),
        }
    }

    /// Evaluator using the dashboard TTL and currency symbol
    #[must_use]
    pub fn from_config(cache: Cache, config: &DashboardConfig) -> Self {
        Self::new(cache, config.cache_ttl(), config.currency_symbol.clone())
    }

    /// Configured memoization TTL
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Formatted value of `stat` over `range`
    ///
    /// # Errors
    ///
    /// Returns `ComputeFailed` if the stat's query fails; nothing is cached then
    pub async fn evaluate(&self, stat: &dyn Stat, range: &TimeRange) -> AppResult<String> {
        let value = self.evaluate_raw(stat, range).await?;
        Ok(stat.format().apply(value, &self.currency_symbol))
    }

    /// Raw value of `stat` over `range`, memoized under `(slot, since)`
    ///
    /// # Errors
    ///
    /// Returns `ComputeFailed` if the stat's query fails or yields a
    /// non-finite number; nothing is cached then
    pub async fn evaluate_raw(&self, stat: &dyn Stat, range: &TimeRange) -> AppResult<f64> {
        let since = range.since;
        let key = CacheKey::stat(stat.cache_slot(), since);

        self.cache
            .get_or_compute(&key, self.ttl, move || async move {
                let started = Instant::now();
                let value = stat
                    .compute(since)
                    .await
                    .map_err(|e| AppError::compute_failed(stat.name(), e))?;
                // NaN and infinities have no JSON form and would poison the slot
                if !value.is_finite() {
                    return Err(AppError::compute_failed(
                        stat.name(),
                        AppError::internal(format!("non-finite result {value}")),
                    ));
                }
                let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                AppLogger::log_stat_computed(stat.name(), since, elapsed_ms);
                Ok(value)
            })
            .await
    }

    /// Drop every memoized range of `stat`, returning how many were removed
    ///
    /// # Errors
    ///
    /// Returns an error if the cache rejects the pattern
    pub async fn invalidate(&self, stat: &dyn Stat) -> AppResult<u64> {
        self.cache
            .invalidate_pattern(&CacheKey::slot_pattern(stat.cache_slot()))
            .await
    }
}
