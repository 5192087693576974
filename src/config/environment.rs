// ABOUTME: Environment-based configuration loading with typed defaults and validation
// ABOUTME: Parses DATABASE_URL, dashboard cache TTL, active subsystems, and mailout limits
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::cache::CacheConfig;
use crate::constants::{cache, env_config};
use crate::errors::{AppError, AppResult};
use crate::hierarchy::ChildPolicy;
use crate::subsystems::StaticActivation;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Complete back-office configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Database connection URL
    pub database_url: String,
    /// Dashboard statistics settings
    pub dashboard: DashboardConfig,
    /// Memoization cache settings
    pub cache: CacheSettings,
    /// Optional subsystems that are loaded
    pub subsystems: StaticActivation,
    /// Category hierarchy policies
    pub categories: CategoryConfig,
    /// Mailout validation limits
    pub mailout: MailoutConfig,
}

/// Dashboard statistics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// How long a computed stat stays memoized
    pub cache_ttl_secs: u64,
    /// Symbol prefixed to price-formatted stats
    pub currency_symbol: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: cache::TTL_DASHBOARD_STATS_SECS,
            currency_symbol: env_config::DEFAULT_CURRENCY_SYMBOL.to_owned(),
        }
    }
}

impl DashboardConfig {
    /// Stat TTL as a duration
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// In-memory cache sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Maximum number of memoized entries
    pub max_entries: usize,
    /// Expired entry sweep interval in seconds
    pub cleanup_interval_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: cache::DEFAULT_CACHE_MAX_ENTRIES,
            cleanup_interval_secs: cache::DEFAULT_CLEANUP_INTERVAL_SECS,
        }
    }
}

/// Category hierarchy configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// What happens to subcategories when their parent is deleted
    pub delete_policy: ChildPolicy,
}

/// Mailout validation limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailoutConfig {
    /// Minimum subject length in characters
    pub subject_min_len: usize,
    /// Minimum body length in characters
    pub body_min_len: usize,
}

impl Default for MailoutConfig {
    fn default() -> Self {
        Self {
            subject_min_len: env_config::DEFAULT_MAILOUT_SUBJECT_MIN_LEN,
            body_min_len: env_config::DEFAULT_MAILOUT_BODY_MIN_LEN,
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            database_url: env_config::DEFAULT_DATABASE_URL.to_owned(),
            dashboard: DashboardConfig::default(),
            cache: CacheSettings::default(),
            subsystems: StaticActivation::default(),
            categories: CategoryConfig::default(),
            mailout: MailoutConfig::default(),
        }
    }
}

impl AdminConfig {
    /// Load configuration from environment variables
    ///
    /// Recognized variables: `DATABASE_URL`, `DASHBOARD_CACHE_TTL_SECS`,
    /// `CURRENCY_SYMBOL`, `CACHE_MAX_ENTRIES`, `CACHE_CLEANUP_INTERVAL_SECS`,
    /// `ACTIVE_SUBSYSTEMS`, `CATEGORY_DELETE_POLICY`,
    /// `MAILOUT_SUBJECT_MIN_LEN` and `MAILOUT_BODY_MIN_LEN`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` when a variable is set but cannot be parsed
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            database_url: env_var_or("DATABASE_URL", env_config::DEFAULT_DATABASE_URL),
            dashboard: DashboardConfig {
                cache_ttl_secs: env_parse_or(
                    "DASHBOARD_CACHE_TTL_SECS",
                    cache::TTL_DASHBOARD_STATS_SECS,
                )?,
                currency_symbol: env_var_or("CURRENCY_SYMBOL", env_config::DEFAULT_CURRENCY_SYMBOL),
            },
            cache: CacheSettings {
                max_entries: env_parse_or("CACHE_MAX_ENTRIES", cache::DEFAULT_CACHE_MAX_ENTRIES)?,
                cleanup_interval_secs: env_parse_or(
                    "CACHE_CLEANUP_INTERVAL_SECS",
                    cache::DEFAULT_CLEANUP_INTERVAL_SECS,
                )?,
            },
            subsystems: StaticActivation::parse(&env_var_or("ACTIVE_SUBSYSTEMS", ""))?,
            categories: CategoryConfig {
                delete_policy: env_parse_or("CATEGORY_DELETE_POLICY", ChildPolicy::default())?,
            },
            mailout: MailoutConfig {
                subject_min_len: env_parse_or(
                    "MAILOUT_SUBJECT_MIN_LEN",
                    env_config::DEFAULT_MAILOUT_SUBJECT_MIN_LEN,
                )?,
                body_min_len: env_parse_or(
                    "MAILOUT_BODY_MIN_LEN",
                    env_config::DEFAULT_MAILOUT_BODY_MIN_LEN,
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns a config error when a value is out of range
    pub fn validate(&self) -> AppResult<()> {
        if self.database_url.trim().is_empty() {
            return Err(AppError::config("DATABASE_URL cannot be empty"));
        }
        if self.dashboard.cache_ttl_secs > cache::MAX_STAT_TTL_SECS {
            return Err(AppError::invalid_config(
                "DASHBOARD_CACHE_TTL_SECS",
                &self.dashboard.cache_ttl_secs.to_string(),
                &format!("must be at most {} seconds", cache::MAX_STAT_TTL_SECS),
            ));
        }
        if self.cache.max_entries == 0 {
            return Err(AppError::invalid_config(
                "CACHE_MAX_ENTRIES",
                "0",
                "must be a positive entry count",
            ));
        }
        Ok(())
    }

    /// Runtime cache configuration derived from these settings
    #[must_use]
    pub const fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_entries: self.cache.max_entries,
            cleanup_interval: Duration::from_secs(self.cache.cleanup_interval_secs),
            enable_background_cleanup: true,
        }
    }

    /// One-line-per-setting summary for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        let subsystems: Vec<&str> = self.subsystems.iter().map(|s| s.as_str()).collect();
        format!(
            "Marketplace admin configuration:\n\
             - Database: {}\n\
             - Dashboard cache TTL: {}s\n\
             - Active subsystems: {}\n\
             - Category delete policy: {}",
            self.database_url,
            self.dashboard.cache_ttl_secs,
            if subsystems.is_empty() {
                "none".to_owned()
            } else {
                subsystems.join(", ")
            },
            self.categories.delete_policy,
        )
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_parse_or<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|e: T::Err| {
            AppError::invalid_config(key, &raw, &e.to_string())
        }),
        _ => Ok(default),
    }
}
