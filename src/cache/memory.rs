// ABOUTME: Bounded in-memory stat store with LRU eviction and per-entry deadlines
// ABOUTME: An optional sweeper task drops expired entries on a fixed interval
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{CacheConfig, CacheKey, CacheProvider};
use crate::errors::{AppError, AppResult};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

/// Memoized value and the instant it stops being served
#[derive(Debug, Clone)]
struct Memo {
    value: Value,
    deadline: Instant,
}

impl Memo {
    /// Memo expiring `ttl` from now; a TTL past the clock's range never expires
    fn new(value: Value, ttl: Duration) -> Self {
        let now = Instant::now();
        let deadline = now
            .checked_add(ttl)
            .or_else(|| now.checked_add(Self::NEVER))
            .unwrap_or(now);
        Self { value, deadline }
    }

    /// Far-future TTL used when the requested one overflows `Instant`
    const NEVER: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

    fn live_at(&self, now: Instant) -> bool {
        now < self.deadline
    }
}

type Memos = Arc<RwLock<LruCache<String, Memo>>>;

/// LRU-bounded memo table shared by every clone
///
/// The sweeper exits once the last clone, and with it the last sender, is
/// dropped.
#[derive(Clone)]
pub struct InMemoryCache {
    memos: Memos,
    _sweeper: Option<mpsc::Sender<()>>,
}

impl InMemoryCache {
    const FALLBACK_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1_000) {
        Some(n) => n,
        None => unreachable!(),
    };

    fn with_config(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(Self::FALLBACK_CAPACITY);
        let memos: Memos = Arc::new(RwLock::new(LruCache::new(capacity)));

        let sweeper = config
            .enable_background_cleanup
            .then(|| Self::spawn_sweeper(memos.clone(), config.cleanup_interval));

        Self {
            memos,
            _sweeper: sweeper,
        }
    }

    fn spawn_sweeper(memos: Memos, every: Duration) -> mpsc::Sender<()> {
        let (alive_tx, mut alive_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(every);
            loop {
                tokio::select! {
                    _ = ticks.tick() => Self::sweep(&memos).await,
                    _ = alive_rx.recv() => {
                        debug!("Stat cache sweeper stopped");
                        break;
                    }
                }
            }
        });

        alive_tx
    }

    async fn sweep(memos: &Memos) {
        let now = Instant::now();
        let mut table = memos.write().await;
        let stale: Vec<String> = table
            .iter()
            .filter(|(_, memo)| !memo.live_at(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            table.pop(key);
        }
        drop(table);

        if !stale.is_empty() {
            debug!(removed = stale.len(), "Swept expired stat values");
        }
    }
}

#[async_trait::async_trait]
impl CacheProvider for InMemoryCache {
    async fn new(config: CacheConfig) -> AppResult<Self> {
        Ok(Self::with_config(&config))
    }

    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()> {
        let memo = Memo::new(serde_json::to_value(value)?, ttl);
        // A full table evicts its least recently used key
        self.memos.write().await.push(key.to_string(), memo);
        Ok(())
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        let key = key.to_string();
        // Write lock: a hit refreshes recency, an expired hit is dropped
        let mut table = self.memos.write().await;
        let value = match table.get(&key) {
            Some(memo) if memo.live_at(Instant::now()) => memo.value.clone(),
            Some(_) => {
                table.pop(&key);
                return Ok(None);
            }
            None => return Ok(None),
        };
        drop(table);
        Ok(Some(serde_json::from_value(value)?))
    }

    async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        self.memos.write().await.pop(&key.to_string());
        Ok(())
    }

    async fn invalidate_pattern(&self, pattern: &str) -> AppResult<u64> {
        let matcher = glob::Pattern::new(pattern).map_err(|e| {
            AppError::invalid_input(format!("Invalid invalidation pattern '{pattern}': {e}"))
        })?;

        let mut table = self.memos.write().await;
        let doomed: Vec<String> = table
            .iter()
            .map(|(key, _)| key)
            .filter(|key| matcher.matches(key))
            .cloned()
            .collect();
        for key in &doomed {
            table.pop(key);
        }
        drop(table);

        Ok(doomed.len() as u64)
    }

    async fn exists(&self, key: &CacheKey) -> AppResult<bool> {
        Ok(self.ttl(key).await?.is_some())
    }

    async fn ttl(&self, key: &CacheKey) -> AppResult<Option<Duration>> {
        let now = Instant::now();
        Ok(self
            .memos
            .read()
            .await
            .peek(&key.to_string())
            .and_then(|memo| memo.deadline.checked_duration_since(now))
            .filter(|remaining| !remaining.is_zero()))
    }

    async fn clear_all(&self) -> AppResult<()> {
        self.memos.write().await.clear();
        Ok(())
    }
}
