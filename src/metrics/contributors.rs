// ABOUTME: Default stat contributors for the base marketplace and its optional subsystems
// ABOUTME: Base item/user stats, auction bid stats, and commerce transaction stats
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::registry::{StatContributor, StatRegistry};
use super::stat::{AggregateStat, StatFormat};
use crate::database::{Aggregate, StatsStore};
use crate::subsystems::Subsystem;
use std::sync::Arc;

/// Listing and watch-list stats
pub const ITEM_STATS: &str = "Item stats";
/// Registration and participation stats
pub const USER_STATS: &str = "User stats";
/// Purchase stats
pub const TRANSACTION_STATS: &str = "Transaction stats";

/// Static description of one aggregate stat
#[derive(Debug, Clone, Copy)]
struct StatSpec {
    group: &'static str,
    name: &'static str,
    slot: &'static str,
    aggregate: Aggregate,
    format: StatFormat,
}

const fn number(
    group: &'static str,
    name: &'static str,
    slot: &'static str,
    aggregate: Aggregate,
) -> StatSpec {
    StatSpec {
        group,
        name,
        slot,
        aggregate,
        format: StatFormat::Number,
    }
}

const fn price(
    group: &'static str,
    name: &'static str,
    slot: &'static str,
    aggregate: Aggregate,
) -> StatSpec {
    StatSpec {
        group,
        name,
        slot,
        aggregate,
        format: StatFormat::Price,
    }
}

const BASE_STATS: &[StatSpec] = &[
    number(ITEM_STATS, "Listed", "total_items", Aggregate::ItemsListed),
    number(ITEM_STATS, "Watched", "total_watched", Aggregate::ItemsWatched),
    number(USER_STATS, "Registered", "total_users", Aggregate::UsersRegistered),
    number(USER_STATS, "Sellers", "total_sellers", Aggregate::Sellers),
];

const AUCTION_STATS: &[StatSpec] = &[
    number(USER_STATS, "Bidders", "total_bidders", Aggregate::Bidders),
    number(ITEM_STATS, "Bids placed", "total_bids_placed", Aggregate::BidsPlaced),
    price(
        ITEM_STATS,
        "Average bid amount",
        "average_bids",
        Aggregate::AverageBidAmount,
    ),
];

const COMMERCE_STATS: &[StatSpec] = &[
    number(USER_STATS, "Buyers", "total_buyers", Aggregate::Buyers),
    number(
        TRANSACTION_STATS,
        "Purchases",
        "total_purchases",
        Aggregate::PurchasesCreated,
    ),
    price(
        TRANSACTION_STATS,
        "Average amount",
        "average_purchases",
        Aggregate::AveragePurchaseAmount,
    ),
];

/// Contributor registering a fixed list of storage aggregates
pub struct AggregateContributor {
    name: &'static str,
    subsystem: Option<Subsystem>,
    specs: &'static [StatSpec],
    store: Arc<dyn StatsStore>,
}

impl AggregateContributor {
    /// Always-on item and user stats
    #[must_use]
    pub fn base(store: Arc<dyn StatsStore>) -> Self {
        Self {
            name: "base",
            subsystem: None,
            specs: BASE_STATS,
            store,
        }
    }

    /// Bidding stats, active with the auctions subsystem
    #[must_use]
    pub fn auctions(store: Arc<dyn StatsStore>) -> Self {
        Self {
            name: "auctions",
            subsystem: Some(Subsystem::Auctions),
            specs: AUCTION_STATS,
            store,
        }
    }

    /// Purchase stats, active with the commerce subsystem
    #[must_use]
    pub fn commerce(store: Arc<dyn StatsStore>) -> Self {
        Self {
            name: "commerce",
            subsystem: Some(Subsystem::Commerce),
            specs: COMMERCE_STATS,
            store,
        }
    }
}

impl StatContributor for AggregateContributor {
    fn name(&self) -> &'static str {
        self.name
    }

    fn required_subsystem(&self) -> Option<Subsystem> {
        self.subsystem
    }

    fn contribute(&self, registry: &mut StatRegistry) {
        for spec in self.specs {
            let stat = AggregateStat::new(spec.name, spec.slot, spec.aggregate, self.store.clone())
                .with_format(spec.format);
            registry.register(spec.group, Arc::new(stat));
        }
    }
}

/// Contributors in registration order: base, then auctions, then commerce
///
/// Feedback has no stats of its own.
#[must_use]
pub fn default_contributors(store: Arc<dyn StatsStore>) -> Vec<Box<dyn StatContributor>> {
    vec![
        Box::new(AggregateContributor::base(store.clone())),
        Box::new(AggregateContributor::auctions(store.clone())),
        Box::new(AggregateContributor::commerce(store)),
    ]
}
