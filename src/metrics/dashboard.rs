// ABOUTME: Dashboard matrix of every registered stat evaluated over every requested range
// ABOUTME: Strict rendering fails on the first error; partial rendering records failed cells
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::contributors::default_contributors;
use super::evaluator::StatEvaluator;
use super::ranges::TimeRange;
use super::registry::StatRegistry;
use crate::cache::factory::Cache;
use crate::config::AdminConfig;
use crate::database::StatsStore;
use crate::errors::{AppResult, ErrorCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// One evaluated (stat, range) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatCell {
    /// Formatted value
    Ok {
        /// Display string
        display: String,
    },
    /// Evaluation failed; only produced by [`Dashboard::render_partial`]
    Failed {
        /// Error code of the failure
        code: ErrorCode,
        /// Human-readable failure
        message: String,
    },
}

impl StatCell {
    /// Display string of a successful cell
    #[must_use]
    pub fn display(&self) -> Option<&str> {
        match self {
            Self::Ok { display } => Some(display),
            Self::Failed { .. } => None,
        }
    }

    /// Whether evaluation failed
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for StatCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok { display } => f.write_str(display),
            Self::Failed { message, .. } => write!(f, "unavailable ({message})"),
        }
    }
}

/// One stat across every range, cells in range order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRow {
    /// Stat name
    pub name: String,
    /// One cell per range
    pub cells: Vec<StatCell>,
}

/// One group of rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSnapshot {
    /// Group heading
    pub name: String,
    /// Rows in registration order
    pub rows: Vec<StatRow>,
}

/// Read-only evaluated dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Column ranges
    pub ranges: Vec<TimeRange>,
    /// Groups in display order
    pub groups: Vec<GroupSnapshot>,
}

impl DashboardSnapshot {
    /// `(group, stat, display)` triples for one range column
    ///
    /// Returns nothing if no range carries `range_label`.
    #[must_use]
    pub fn triples(&self, range_label: &str) -> Vec<(String, String, String)> {
        let Some(column) = self.ranges.iter().position(|r| r.label == range_label) else {
            return Vec::new();
        };

        self.groups
            .iter()
            .flat_map(|group| {
                group.rows.iter().filter_map(move |row| {
                    row.cells.get(column).map(|cell| {
                        (group.name.clone(), row.name.clone(), cell.to_string())
                    })
                })
            })
            .collect()
    }

    /// Cell for one stat and range
    #[must_use]
    pub fn cell(&self, group: &str, stat: &str, range_label: &str) -> Option<&StatCell> {
        let column = self.ranges.iter().position(|r| r.label == range_label)?;
        self.groups
            .iter()
            .find(|g| g.name == group)?
            .rows
            .iter()
            .find(|row| row.name == stat)?
            .cells
            .get(column)
    }

    /// Number of failed cells
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|group| &group.rows)
            .flat_map(|row| &row.cells)
            .filter(|cell| cell.is_failed())
            .count()
    }
}

/// Registry plus evaluator
pub struct Dashboard {
    registry: StatRegistry,
    evaluator: StatEvaluator,
}

impl Dashboard {
    /// Dashboard over an already composed registry
    #[must_use]
    pub const fn new(registry: StatRegistry, evaluator: StatEvaluator) -> Self {
        Self {
            registry,
            evaluator,
        }
    }

    /// Default contributors composed against the configured subsystems
    #[must_use]
    pub fn from_config(config: &AdminConfig, store: Arc<dyn StatsStore>, cache: Cache) -> Self {
        let registry = StatRegistry::compose(&default_contributors(store), &config.subsystems);
        let evaluator = StatEvaluator::from_config(cache, &config.dashboard);
        Self::new(registry, evaluator)
    }

    /// Composed registry
    #[must_use]
    pub const fn registry(&self) -> &StatRegistry {
        &self.registry
    }

    /// Evaluator used for every cell
    #[must_use]
    pub const fn evaluator(&self) -> &StatEvaluator {
        &self.evaluator
    }

    /// Evaluate every stat over every range
    ///
    /// # Errors
    ///
    /// Returns the first `ComputeFailed` error encountered
    pub async fn render(&self, ranges: &[TimeRange]) -> AppResult<DashboardSnapshot> {
        let mut groups = Vec::with_capacity(self.registry.groups().len());

        for group in self.registry.groups() {
            let mut rows = Vec::with_capacity(group.stats().len());
            for stat in group.stats() {
                let mut cells = Vec::with_capacity(ranges.len());
                for range in ranges {
                    let display = self.evaluator.evaluate(stat.as_ref(), range).await?;
                    cells.push(StatCell::Ok { display });
                }
                rows.push(StatRow {
                    name: stat.name().to_owned(),
                    cells,
                });
            }
            groups.push(GroupSnapshot {
                name: group.name().to_owned(),
                rows,
            });
        }

        Ok(DashboardSnapshot {
            ranges: ranges.to_vec(),
            groups,
        })
    }

    /// Evaluate every stat over every range, recording failures per cell
    pub async fn render_partial(&self, ranges: &[TimeRange]) -> DashboardSnapshot {
        let mut groups = Vec::with_capacity(self.registry.groups().len());

        for group in self.registry.groups() {
            let mut rows = Vec::with_capacity(group.stats().len());
            for stat in group.stats() {
                let mut cells = Vec::with_capacity(ranges.len());
                for range in ranges {
                    let cell = match self.evaluator.evaluate(stat.as_ref(), range).await {
                        Ok(display) => StatCell::Ok { display },
                        Err(e) => {
                            warn!(
                                stat.name = stat.name(),
                                range = %range.label,
                                error = %e,
                                "Dashboard cell failed"
                            );
                            StatCell::Failed {
                                code: e.code,
                                message: e.message,
                            }
                        }
                    };
                    cells.push(cell);
                }
                rows.push(StatRow {
                    name: stat.name().to_owned(),
                    cells,
                });
            }
            groups.push(GroupSnapshot {
                name: group.name().to_owned(),
                rows,
            });
        }

        DashboardSnapshot {
            ranges: ranges.to_vec(),
            groups,
        }
    }
}
