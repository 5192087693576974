// ABOUTME: Cache facade adding single-flight memoization on top of the backend
// ABOUTME: At most one computation per key populates the cache while others wait for it
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{memory::InMemoryCache, CacheConfig, CacheKey, CacheProvider};
use crate::errors::AppResult;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Process-wide stat cache
///
/// Cloning is cheap; clones share both the backing store and the in-flight
/// locks, so every request handler should hold a clone of one process-wide
/// instance.
#[derive(Clone)]
pub struct Cache {
    inner: InMemoryCache,
    in_flight: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl Cache {
    /// Start the in-memory backend
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot start
    pub async fn new(config: CacheConfig) -> AppResult<Self> {
        tracing::info!(
            max_entries = config.max_entries,
            sweep = config.enable_background_cleanup,
            "Stat cache ready"
        );
        let inner = InMemoryCache::new(config).await?;
        Ok(Self {
            inner,
            in_flight: Arc::new(DashMap::new()),
        })
    }

    /// Look up `key`, computing and storing it on a miss
    ///
    /// Concurrent callers for the same key serialize on a per-key lock and
    /// re-check the cache after acquiring it, so only the first caller runs
    /// `compute` within one TTL window. A failed computation stores nothing
    /// and the next caller retries.
    ///
    /// # Errors
    ///
    /// Returns the error from `compute`, or a cache serialization error
    pub async fn get_or_compute<T, F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        compute: F,
    ) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = AppResult<T>> + Send,
    {
        if let Some(hit) = self.inner.get(key).await? {
            tracing::debug!(cache.key = %key, "Cache hit");
            return Ok(hit);
        }

        let key_str = key.to_string();
        let slot = self
            .in_flight
            .entry(key_str.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = slot.lock().await;
            self.fill(key, ttl, compute).await
        };
        drop(slot);

        // Only the map's own reference left means nobody is waiting on this slot
        self.in_flight
            .remove_if(&key_str, |_, lock| Arc::strong_count(lock) == 1);

        result
    }

    async fn fill<T, F, Fut>(&self, key: &CacheKey, ttl: Duration, compute: F) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = AppResult<T>> + Send,
    {
        // Another caller may have filled the slot while we waited for the lock
        if let Some(hit) = self.inner.get(key).await? {
            tracing::debug!(cache.key = %key, "Cache filled by concurrent caller");
            return Ok(hit);
        }

        tracing::debug!(cache.key = %key, "Cache miss");
        let value = compute().await?;
        self.inner.set(key, &value, ttl).await?;
        Ok(value)
    }

    /// Memoize `value` under `key` without the single-flight lock
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` if `value` cannot be serialized
    pub async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    /// Live value under `key`
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` if the stored value does not fit `T`
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        self.inner.get(key).await
    }

    /// Forget one key
    ///
    /// # Errors
    ///
    /// Backend specific
    pub async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        self.inner.invalidate(key).await
    }

    /// Forget every key matching `pattern`, returning the count removed
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the pattern is not a valid glob
    pub async fn invalidate_pattern(&self, pattern: &str) -> AppResult<u64> {
        self.inner.invalidate_pattern(pattern).await
    }

    /// Whether `key` holds a live value
    ///
    /// # Errors
    ///
    /// Backend specific
    pub async fn exists(&self, key: &CacheKey) -> AppResult<bool> {
        self.inner.exists(key).await
    }

    /// Time left before `key` expires
    ///
    /// # Errors
    ///
    /// Backend specific
    pub async fn ttl(&self, key: &CacheKey) -> AppResult<Option<Duration>> {
        self.inner.ttl(key).await
    }

    /// Forget everything
    ///
    /// # Errors
    ///
    /// Backend specific
    pub async fn clear_all(&self) -> AppResult<()> {
        self.inner.clear_all().await
    }

    /// Number of keys with a computation currently in flight
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}
