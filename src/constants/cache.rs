// ABOUTME: Cache-related constants for stat TTL, capacity, and cleanup intervals
// ABOUTME: Defaults for the in-memory memoization backend
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Default maximum cache entries for in-memory cache
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;

/// Default cleanup interval in seconds for expired entries
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300; // 5 minutes

/// Dashboard stat TTL (10 minutes) - aggregates are expensive, minutes of staleness is fine
pub const TTL_DASHBOARD_STATS_SECS: u64 = 600;

/// Longest accepted dashboard stat TTL (30 days)
pub const MAX_STAT_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Key prefix for memoized stats
pub const STAT_KEY_PREFIX: &str = "stats";
