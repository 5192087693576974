// ABOUTME: Stat abstraction for named, range-parameterized aggregate computations
// ABOUTME: AggregateStat evaluates a storage aggregate above a lower-bound timestamp
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::database::{Aggregate, StatsStore};
use crate::errors::AppResult;
use crate::formatters::{format_number, format_price};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a computed value is displayed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatFormat {
    /// Integer count with thousands separators
    #[default]
    Number,
    /// Currency amount with two decimals
    Price,
}

impl StatFormat {
    /// Render `value` for display
    #[must_use]
    pub fn apply(self, value: f64, currency_symbol: &str) -> String {
        match self {
            Self::Number => format_number(value),
            Self::Price => format_price(value, currency_symbol),
        }
    }
}

/// A named, cacheable statistic evaluable over any lower time bound
///
/// `compute` must only read storage; the evaluator memoizes its result under
/// `(cache_slot, since)`.
#[async_trait]
pub trait Stat: Send + Sync {
    /// Display name, unique within its group
    fn name(&self) -> &str;

    /// Memoization slot shared by every range of this stat
    fn cache_slot(&self) -> &str;

    /// Display format
    fn format(&self) -> StatFormat {
        StatFormat::Number
    }

    /// Raw value over rows created at or after `since` (epoch seconds)
    async fn compute(&self, since: i64) -> AppResult<f64>;
}

/// Stat backed by one [`Aggregate`] query
pub struct AggregateStat {
    name: String,
    slot: String,
    aggregate: Aggregate,
    format: StatFormat,
    store: Arc<dyn StatsStore>,
}

impl AggregateStat {
    /// Number-formatted aggregate stat
    pub fn new(
        name: impl Into<String>,
        slot: impl Into<String>,
        aggregate: Aggregate,
        store: Arc<dyn StatsStore>,
    ) -> Self {
        Self {
            name: name.into(),
            slot: slot.into(),
            aggregate,
            format: StatFormat::Number,
            store,
        }
    }

    /// Override the display format
    #[must_use]
    pub const fn with_format(mut self, format: StatFormat) -> Self {
        self.format = format;
        self
    }
}

#[async_trait]
impl Stat for AggregateStat {
    fn name(&self) -> &str {
        &self.name
    }

    fn cache_slot(&self) -> &str {
        &self.slot
    }

    fn format(&self) -> StatFormat {
        self.format
    }

    async fn compute(&self, since: i64) -> AppResult<f64> {
        self.store.aggregate(self.aggregate, since).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_apply() {
        assert_eq!(StatFormat::Number.apply(1234.4, "£"), "1,234");
        assert_eq!(StatFormat::Price.apply(1234.4, "£"), "£1,234.40");
    }
}
