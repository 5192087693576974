// ABOUTME: Extensible metrics layer for the back-office dashboard
// ABOUTME: Time ranges, stats, contributor-composed registry, memoized evaluation and rendering
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Dashboard metrics
//!
//! A [`StatRegistry`] is composed from [`StatContributor`]s, each optionally
//! gated on a [`crate::subsystems::Subsystem`]. The [`StatEvaluator`] memoizes
//! every `(stat, range)` pair through the shared [`crate::cache::factory::Cache`]
//! with single-flight semantics, and [`Dashboard`] renders the whole matrix
//! into a read-only [`DashboardSnapshot`].

pub mod contributors;
pub mod dashboard;
pub mod evaluator;
pub mod ranges;
pub mod registry;
pub mod stat;

pub use contributors::{
    default_contributors, AggregateContributor, ITEM_STATS, TRANSACTION_STATS, USER_STATS,
};
pub use dashboard::{Dashboard, DashboardSnapshot, GroupSnapshot, StatCell, StatRow};
pub use evaluator::StatEvaluator;
pub use ranges::TimeRange;
pub use registry::{StatContributor, StatGroup, StatRegistry};
pub use stat::{AggregateStat, Stat, StatFormat};
