// ABOUTME: Logging configuration and structured logging setup for the back-office core
// ABOUTME: Env-driven tracing-subscriber setup plus structured events for mutations, stats and mailouts
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Structured logging setup on `tracing-subscriber`

use crate::constants::service_names;
use crate::errors::{AppError, AppResult};
use std::env;
use std::io;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One `JSON` object per event
    Json,
    /// Multi-field human output
    #[default]
    Pretty,
    /// Single-line terminal output
    Compact,
}

impl LogFormat {
    fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

/// Subscriber settings for the CLI and embedding services
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive such as `info` or `marketplace_admin=debug`
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Emit source file and line on every event
    pub include_location: bool,
    /// Emit the thread id on every event
    pub include_thread: bool,
    /// Reported in the startup event
    pub service_name: String,
    /// Deployment environment reported in the startup event
    pub environment: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::default(),
            include_location: false,
            include_thread: false,
            service_name: service_names::MARKETPLACE_ADMIN.into(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG`, `LOG_FORMAT`, `LOG_INCLUDE_LOCATION`,
    /// `LOG_INCLUDE_THREAD`, `SERVICE_NAME` and `ENVIRONMENT`
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let environment = env::var("ENVIRONMENT").unwrap_or(defaults.environment);

        Self {
            level: env::var("RUST_LOG").unwrap_or(defaults.level),
            format: env::var("LOG_FORMAT")
                .map(|name| LogFormat::from_name(&name))
                .unwrap_or_default(),
            include_location: environment == "production"
                || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_thread: env::var("LOG_INCLUDE_THREAD").is_ok(),
            service_name: env::var("SERVICE_NAME").unwrap_or(defaults.service_name),
            environment,
        }
    }

    /// Override the level, e.g. from a `--verbose` flag
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    fn env_filter(&self) -> EnvFilter {
        let crate_level = format!("marketplace_admin={}", self.level)
            .parse()
            .unwrap_or_else(|_| tracing::Level::INFO.into());
        // sqlx logs every statement at info
        let sqlx_level = "sqlx=warn"
            .parse()
            .unwrap_or_else(|_| tracing::Level::WARN.into());

        EnvFilter::new(&self.level)
            .add_directive(sqlx_level)
            .add_directive(crate_level)
    }

    /// Install the global subscriber, writing to stderr
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if a global subscriber is already installed
    pub fn init(&self) -> AppResult<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        let layer = fmt::layer()
            .with_writer(io::stderr)
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_thread_ids(self.include_thread);

        let installed = match self.format {
            LogFormat::Json => registry.with(layer.json()).try_init(),
            LogFormat::Pretty => registry.with(layer.with_target(true)).try_init(),
            LogFormat::Compact => registry.with(layer.compact().with_target(false)).try_init(),
        };
        installed.map_err(|e| AppError::internal(format!("Failed to install logger: {e}")))?;

        info!(
            service.name = %self.service_name,
            service.version = env!("CARGO_PKG_VERSION"),
            service.environment = %self.environment,
            log.level = %self.level,
            log.format = ?self.format,
            "Logging initialized"
        );
        Ok(())
    }
}

/// Application-specific structured events
pub struct AppLogger;

impl AppLogger {
    /// Log a category mutation outcome
    pub fn log_category_mutation(operation: &str, category_id: Option<i64>, success: bool) {
        if success {
            info!(
                category.operation = %operation,
                category.id = category_id.unwrap_or_default(),
                "Category mutation applied"
            );
        } else {
            warn!(
                category.operation = %operation,
                category.id = category_id.unwrap_or_default(),
                "Category mutation rejected"
            );
        }
    }

    /// Log a stat computation (cache miss)
    pub fn log_stat_computed(stat: &str, since: i64, duration_ms: u64) {
        info!(
            stat.name = %stat,
            stat.since = since,
            stat.duration_ms = duration_ms,
            "Dashboard stat computed"
        );
    }

    /// Log a finished mailout
    pub fn log_mailout(sent: usize, failed: usize) {
        info!(mailout.sent = sent, mailout.failed = failed, "Mailout finished");
    }
}
