// ABOUTME: Ordered registry of stat groups composed from subsystem contributors
// ABOUTME: Activation is queried once per contributor in a fixed, reproducible order
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::stat::Stat;
use crate::subsystems::{Subsystem, SubsystemActivation};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Ordered stats under one display heading
#[derive(Clone)]
pub struct StatGroup {
    name: String,
    stats: Vec<Arc<dyn Stat>>,
}

impl StatGroup {
    /// Display heading
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stats in registration order
    #[must_use]
    pub fn stats(&self) -> &[Arc<dyn Stat>] {
        &self.stats
    }

    /// Stat names in registration order
    #[must_use]
    pub fn stat_names(&self) -> Vec<&str> {
        self.stats.iter().map(|stat| stat.name()).collect()
    }
}

/// Ordered mapping of group to ordered stats
///
/// Display order is registration order, for groups and for stats within a
/// group alike.
#[derive(Clone, Default)]
pub struct StatRegistry {
    groups: Vec<StatGroup>,
}

impl StatRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from every contributor whose subsystem is active
    ///
    /// Every known subsystem is queried exactly once, in [`Subsystem::ALL`]
    /// order, before any contributor runs. Contributors then run in slice
    /// order; those without a required subsystem always run.
    #[must_use]
    pub fn compose(
        contributors: &[Box<dyn StatContributor>],
        activation: &dyn SubsystemActivation,
    ) -> Self {
        let active: BTreeSet<Subsystem> = Subsystem::ALL
            .into_iter()
            .filter(|&subsystem| activation.is_active(subsystem))
            .collect();
        let mut registry = Self::new();

        for contributor in contributors {
            if let Some(subsystem) = contributor.required_subsystem() {
                if !active.contains(&subsystem) {
                    debug!(
                        contributor = contributor.name(),
                        subsystem = %subsystem,
                        "Skipping stats for inactive subsystem"
                    );
                    continue;
                }
            }
            contributor.contribute(&mut registry);
        }

        debug!(
            groups = registry.groups.len(),
            stats = registry.len(),
            "Stat registry composed"
        );
        registry
    }

    /// Append `stat` to `group`, creating the group at the end if needed
    ///
    /// A stat whose name already exists in the group replaces it in place.
    pub fn register(&mut self, group: &str, stat: Arc<dyn Stat>) {
        let index = match self.groups.iter().position(|g| g.name == group) {
            Some(index) => index,
            None => {
                self.groups.push(StatGroup {
                    name: group.to_owned(),
                    stats: Vec::new(),
                });
                self.groups.len() - 1
            }
        };

        let stats = &mut self.groups[index].stats;
        match stats.iter().position(|existing| existing.name() == stat.name()) {
            Some(position) => stats[position] = stat,
            None => stats.push(stat),
        }
    }

    /// Groups in display order
    #[must_use]
    pub fn groups(&self) -> &[StatGroup] {
        &self.groups
    }

    /// Group by heading
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&StatGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    /// Stat by group heading and name
    #[must_use]
    pub fn find(&self, group: &str, name: &str) -> Option<&Arc<dyn Stat>> {
        self.group(group)?
            .stats
            .iter()
            .find(|stat| stat.name() == name)
    }

    /// `(group, [stat names])` pairs in display order
    #[must_use]
    pub fn layout(&self) -> Vec<(String, Vec<String>)> {
        self.groups
            .iter()
            .map(|group| {
                (
                    group.name.clone(),
                    group.stats.iter().map(|s| s.name().to_owned()).collect(),
                )
            })
            .collect()
    }

    /// Total number of stats across groups
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(|group| group.stats.len()).sum()
    }

    /// Whether no stat is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for StatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatRegistry")
            .field("layout", &self.layout())
            .finish()
    }
}

/// Source of stat definitions, optionally gated on a subsystem
pub trait StatContributor: Send + Sync {
    /// Contributor name for logs
    fn name(&self) -> &'static str;

    /// Subsystem that must be active, `None` for always-on stats
    fn required_subsystem(&self) -> Option<Subsystem>;

    /// Register this contributor's stats
    fn contribute(&self, registry: &mut StatRegistry);
}
