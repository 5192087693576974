// ABOUTME: Configuration management module for back-office settings
// ABOUTME: Environment-only configuration for storage, dashboard caching, subsystems and mailouts
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Configuration module
//!
//! All settings come from environment variables; there are no config files.
//! See [`environment::AdminConfig::from_env`] for the variable list.

/// Environment configuration
pub mod environment;

pub use environment::{
    AdminConfig, CacheSettings, CategoryConfig, DashboardConfig, MailoutConfig,
};
