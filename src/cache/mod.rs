// ABOUTME: Cache abstraction layer for memoizing expensive dashboard aggregates
// ABOUTME: Backend trait, stat keys keyed by range lower bound, and the LRU in-memory store
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Cache facade with single-flight memoization
pub mod factory;
/// In-memory cache implementation
pub mod memory;

use crate::constants::cache::{
    DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CLEANUP_INTERVAL_SECS, STAT_KEY_PREFIX,
};
use crate::errors::AppResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Backend storing serialized stat values under string keys with a TTL
///
/// # Examples
///
/// ```rust,no_run
/// use marketplace_admin::cache::{CacheConfig, CacheKey, CacheProvider};
/// use marketplace_admin::cache::memory::InMemoryCache;
/// use std::time::Duration;
/// # async fn example() -> Result<(), marketplace_admin::errors::AppError> {
///
/// let config = CacheConfig {
///     enable_background_cleanup: false,
///     ..Default::default()
/// };
/// let cache = InMemoryCache::new(config).await?;
///
/// let key = CacheKey::stat("total_items", 0);
/// cache.set(&key, &42.0_f64, Duration::from_secs(600)).await?;
///
/// let cached: Option<f64> = cache.get(&key).await?;
/// assert_eq!(cached, Some(42.0));
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait CacheProvider: Send + Sync + Clone {
    /// Build the backend
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot start
    async fn new(config: CacheConfig) -> AppResult<Self>
    where
        Self: Sized;

    /// Memoize `value` under `key` for `ttl`
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` if `value` cannot be serialized
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()>;

    /// Live value under `key`; `None` when absent or past its TTL
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` if the stored value does not fit `T`
    async fn get<T: for<'de> Deserialize<'de>>(&self, key: &CacheKey) -> AppResult<Option<T>>;

    /// Forget one key
    ///
    /// # Errors
    ///
    /// Backend specific
    async fn invalidate(&self, key: &CacheKey) -> AppResult<()>;

    /// Forget every key matching a glob such as [`CacheKey::slot_pattern`],
    /// returning how many were removed
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the pattern is not a valid glob
    async fn invalidate_pattern(&self, pattern: &str) -> AppResult<u64>;

    /// Whether `key` holds a live value
    ///
    /// # Errors
    ///
    /// Backend specific
    async fn exists(&self, key: &CacheKey) -> AppResult<bool>;

    /// Time left before `key` expires
    ///
    /// # Errors
    ///
    /// Backend specific
    async fn ttl(&self, key: &CacheKey) -> AppResult<Option<Duration>>;

    /// Forget everything
    ///
    /// # Errors
    ///
    /// Backend specific
    async fn clear_all(&self) -> AppResult<()>;
}

/// Sizing and sweeping of the in-memory backend
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Entries kept before least-recently-used eviction
    pub max_entries: usize,
    /// How often expired entries are swept
    pub cleanup_interval: Duration,
    /// Spawn the sweeper task; tests turn this off
    pub enable_background_cleanup: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
            enable_background_cleanup: true,
        }
    }
}

/// Structured cache key
///
/// Stats are keyed by memoization slot *and* range lower bound, so the same
/// stat evaluated for "Today" and "Overall" never shares a cached value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Memoization slot shared by every range of one stat
    pub slot: String,
    /// Range lower bound in epoch seconds, `0` for unbounded
    pub since: i64,
}

impl CacheKey {
    /// Key for one stat over one range
    pub fn stat(slot: impl Into<String>, since: i64) -> Self {
        Self {
            slot: slot.into(),
            since,
        }
    }

    /// Pattern matching every range of one slot
    #[must_use]
    pub fn slot_pattern(slot: &str) -> String {
        format!("{STAT_KEY_PREFIX}:{}:since:*", glob::Pattern::escape(slot))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{STAT_KEY_PREFIX}:{}:since:{}", self.slot, self.since)
    }
}
