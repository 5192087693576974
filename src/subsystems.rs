// ABOUTME: Optional marketplace subsystems and the activation capability queried by the registry
// ABOUTME: Known fixed set of plugin names parsed from configuration
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Optional feature module whose activation adds stats and behaviors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
    /// Bidding on listed items
    Auctions,
    /// Fixed-price purchases
    Commerce,
    /// Buyer/seller feedback
    Feedback,
}

impl Subsystem {
    /// Every known subsystem, in check order
    pub const ALL: [Self; 3] = [Self::Auctions, Self::Commerce, Self::Feedback];

    /// Configuration name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auctions => "auctions",
            Self::Commerce => "commerce",
            Self::Feedback => "feedback",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subsystem {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|subsystem| subsystem.as_str() == wanted)
            .ok_or_else(|| {
                AppError::invalid_config(
                    "ACTIVE_SUBSYSTEMS",
                    s,
                    "expected one of auctions, commerce, feedback",
                )
            })
    }
}

/// Answers whether an optional subsystem is loaded
pub trait SubsystemActivation: Send + Sync {
    /// Whether `subsystem` is active for this deployment
    fn is_active(&self, subsystem: Subsystem) -> bool;
}

/// Activation set fixed at startup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticActivation {
    active: BTreeSet<Subsystem>,
}

impl StaticActivation {
    /// Activation with exactly the given subsystems
    pub fn new(active: impl IntoIterator<Item = Subsystem>) -> Self {
        Self {
            active: active.into_iter().collect(),
        }
    }

    /// Parse a comma separated list such as `"auctions, commerce"`
    ///
    /// # Errors
    ///
    /// Returns a config error naming the first unknown subsystem
    pub fn parse(list: &str) -> AppResult<Self> {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Subsystem::from_str)
            .collect::<AppResult<BTreeSet<_>>>()
            .map(|active| Self { active })
    }

    /// Active subsystems in check order
    pub fn iter(&self) -> impl Iterator<Item = Subsystem> + '_ {
        self.active.iter().copied()
    }
}

impl SubsystemActivation for StaticActivation {
    fn is_active(&self, subsystem: Subsystem) -> bool {
        self.active.contains(&subsystem)
    }
}
