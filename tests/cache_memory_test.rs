// ABOUTME: Unit tests for in-memory cache implementation
// ABOUTME: Tests TTL expiration, capacity limits, slot invalidation and single-flight computation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use anyhow::Result;
use marketplace_admin::{
    cache::{factory::Cache, CacheConfig, CacheKey},
    errors::{AppError, AppResult},
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Helper: Create in-memory cache with custom config
async fn create_test_cache(max_entries: usize) -> Result<Cache> {
    let config = CacheConfig {
        max_entries,
        cleanup_interval: Duration::from_secs(300),
        enable_background_cleanup: false,
    };
    Ok(Cache::new(config).await?)
}

#[tokio::test]
async fn test_cache_set_and_get() -> Result<()> {
    let cache = create_test_cache(100).await?;
    let key = CacheKey::stat("total_items", 0);

    cache.set(&key, &1_234.0_f64, Duration::from_secs(10)).await?;

    let retrieved: Option<f64> = cache.get(&key).await?;
    assert_eq!(retrieved, Some(1_234.0));
    Ok(())
}

#[tokio::test]
async fn test_cache_expiration() -> Result<()> {
    let cache = create_test_cache(100).await?;
    let key = CacheKey::stat("total_users", 0);

    cache.set(&key, &7.0_f64, Duration::from_millis(100)).await?;
    assert!(cache.exists(&key).await?);

    tokio::time::sleep(Duration::from_millis(150)).await;

    let retrieved: Option<f64> = cache.get(&key).await?;
    assert_eq!(retrieved, None);
    assert!(!cache.exists(&key).await?);
    Ok(())
}

#[tokio::test]
async fn test_unrepresentable_ttl_keeps_value() -> Result<()> {
    let cache = create_test_cache(100).await?;
    let key = CacheKey::stat("total_watched", 0);

    cache.set(&key, &3.0_f64, Duration::MAX).await?;

    let retrieved: Option<f64> = cache.get(&key).await?;
    assert_eq!(retrieved, Some(3.0));
    assert!(cache.ttl(&key).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_cache_ttl() -> Result<()> {
    let cache = create_test_cache(100).await?;
    let key = CacheKey::stat("total_bids_placed", 0);

    cache.set(&key, &3.0_f64, Duration::from_secs(10)).await?;

    let ttl = cache.ttl(&key).await?.unwrap();
    assert!(ttl.as_secs() <= 10);
    assert!(ttl.as_secs() >= 9);
    assert_eq!(cache.ttl(&CacheKey::stat("missing", 0)).await?, None);
    Ok(())
}

#[tokio::test]
async fn test_cache_invalidate() -> Result<()> {
    let cache = create_test_cache(100).await?;
    let key = CacheKey::stat("total_watched", 0);

    cache.set(&key, &1.0_f64, Duration::from_secs(60)).await?;
    cache.invalidate(&key).await?;

    assert!(!cache.exists(&key).await?);
    Ok(())
}

#[tokio::test]
async fn test_slot_pattern_removes_every_range_of_one_stat() -> Result<()> {
    let cache = create_test_cache(100).await?;
    let ttl = Duration::from_secs(60);

    let overall = CacheKey::stat("total_items", 0);
    let today = CacheKey::stat("total_items", 1_700_000_000);
    let other = CacheKey::stat("total_items_archived", 0);

    cache.set(&overall, &3.0_f64, ttl).await?;
    cache.set(&today, &1.0_f64, ttl).await?;
    cache.set(&other, &9.0_f64, ttl).await?;

    let removed = cache
        .invalidate_pattern(&CacheKey::slot_pattern("total_items"))
        .await?;

    assert_eq!(removed, 2);
    assert!(!cache.exists(&overall).await?);
    assert!(!cache.exists(&today).await?);
    assert!(cache.exists(&other).await?);
    Ok(())
}

#[tokio::test]
async fn test_slot_pattern_escapes_glob_characters() -> Result<()> {
    let cache = create_test_cache(100).await?;
    let ttl = Duration::from_secs(60);

    cache.set(&CacheKey::stat("bids[1]", 0), &1.0_f64, ttl).await?;
    cache.set(&CacheKey::stat("bids1", 0), &1.0_f64, ttl).await?;

    let removed = cache
        .invalidate_pattern(&CacheKey::slot_pattern("bids[1]"))
        .await?;

    assert_eq!(removed, 1);
    assert!(cache.exists(&CacheKey::stat("bids1", 0)).await?);
    Ok(())
}

#[tokio::test]
async fn test_invalid_pattern_rejected() -> Result<()> {
    let cache = create_test_cache(100).await?;
    assert!(cache.invalidate_pattern("stats:[").await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_cache_lru_eviction() -> Result<()> {
    let cache = create_test_cache(2).await?;
    let ttl = Duration::from_secs(60);
    let first = CacheKey::stat("first", 0);
    let second = CacheKey::stat("second", 0);
    let third = CacheKey::stat("third", 0);

    cache.set(&first, &1.0_f64, ttl).await?;
    cache.set(&second, &2.0_f64, ttl).await?;

    // Touch `first` so `second` becomes least recently used
    let _: Option<f64> = cache.get(&first).await?;
    cache.set(&third, &3.0_f64, ttl).await?;

    assert!(cache.exists(&first).await?);
    assert!(!cache.exists(&second).await?);
    assert!(cache.exists(&third).await?);
    Ok(())
}

#[tokio::test]
async fn test_clear_all() -> Result<()> {
    let cache = create_test_cache(100).await?;
    let key = CacheKey::stat("total_users", 0);

    cache.set(&key, &1.0_f64, Duration::from_secs(60)).await?;
    cache.clear_all().await?;

    assert!(!cache.exists(&key).await?);
    Ok(())
}

#[tokio::test]
async fn test_get_or_compute_stores_success_only() -> Result<()> {
    let cache = create_test_cache(100).await?;
    let key = CacheKey::stat("total_purchases", 0);
    let ttl = Duration::from_secs(60);

    let failed: AppResult<f64> = cache
        .get_or_compute(&key, ttl, || async {
            Err(AppError::storage("database is locked"))
        })
        .await;
    assert!(failed.is_err());
    assert!(!cache.exists(&key).await?);

    let value: f64 = cache
        .get_or_compute(&key, ttl, || async { Ok(5.0) })
        .await?;
    assert!((value - 5.0).abs() < f64::EPSILON);

    let cached: f64 = cache
        .get_or_compute(&key, ttl, || async { Ok(99.0) })
        .await?;
    assert!((cached - 5.0).abs() < f64::EPSILON);
    assert_eq!(cache.in_flight_count(), 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_get_or_compute_single_flight() -> Result<()> {
    let cache = create_test_cache(100).await?;
    let key = CacheKey::stat("average_bids", 0);
    let calls = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let cache = cache.clone();
            let key = key.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                cache
                    .get_or_compute(&key, Duration::from_secs(60), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Ok(12.5_f64)
                    })
                    .await
            })
        })
        .collect();

    for handle in handles {
        let value = handle.await??;
        assert!((value - 12.5).abs() < f64::EPSILON);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.in_flight_count(), 0);
    Ok(())
}
