// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Groups cache defaults, outcome messages, and configuration defaults by domain
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large file.

pub mod cache;
pub mod messages;

/// Environment-based configuration defaults
pub mod env_config {
    /// Default database URL when `DATABASE_URL` is unset
    pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/marketplace.db";

    /// Default currency symbol for price-formatted stats
    pub const DEFAULT_CURRENCY_SYMBOL: &str = "£";

    /// Minimum mailout subject length
    pub const DEFAULT_MAILOUT_SUBJECT_MIN_LEN: usize = 4;

    /// Minimum mailout body length
    pub const DEFAULT_MAILOUT_BODY_MIN_LEN: usize = 10;
}

/// Service identification used by logging
pub mod service_names {
    /// Service name reported in structured logs
    pub const MARKETPLACE_ADMIN: &str = "marketplace-admin";
}

/// Form field names that hierarchy errors are addressed to
pub mod fields {
    /// Category being updated or deleted
    pub const CATEGORY_ID: &str = "category_id";
    /// Requested parent category
    pub const PARENT_CATEGORY_ID: &str = "parent_category_id";
    /// Category display name
    pub const NAME: &str = "name";
    /// Category URL slug
    pub const SLUG: &str = "slug";
    /// Bulk sort mapping
    pub const CATEGORIES: &str = "categories";
    /// Mailout recipient list
    pub const USERS: &str = "users";
    /// Mailout subject line
    pub const SUBJECT: &str = "subject";
    /// Mailout body
    pub const BODY: &str = "body";
}
