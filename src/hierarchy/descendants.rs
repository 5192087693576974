// ABOUTME: Pure traversals over a category snapshot
// ABOUTME: Breadth-first descendant closure and ancestor-chain walks that tolerate corrupt cycles
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::models::{Category, CategoryId};
use std::collections::{HashMap, HashSet, VecDeque};

/// Every category transitively beneath `id`, excluding `id` itself
///
/// Each node is visited once, so a parent relation that already contains a
/// cycle still terminates.
#[must_use]
pub fn descendant_ids(categories: &[Category], id: CategoryId) -> HashSet<CategoryId> {
    let mut children: HashMap<CategoryId, Vec<CategoryId>> = HashMap::new();
    for category in categories {
        if let Some(parent_id) = category.parent_id {
            children.entry(parent_id).or_default().push(category.id);
        }
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([id]);

    while let Some(node) = queue.pop_front() {
        let Some(direct) = children.get(&node) else {
            continue;
        };
        for &child in direct {
            if child != id && visited.insert(child) {
                queue.push_back(child);
            }
        }
    }

    visited
}

/// Whether walking parent links upward from `start` (inclusive) reaches `target`
#[must_use]
pub fn ancestor_chain_contains(
    categories: &[Category],
    start: CategoryId,
    target: CategoryId,
) -> bool {
    let parents: HashMap<CategoryId, Option<CategoryId>> = categories
        .iter()
        .map(|category| (category.id, category.parent_id))
        .collect();

    let mut visited = HashSet::new();
    let mut current = Some(start);

    while let Some(node) = current {
        if node == target {
            return true;
        }
        if !visited.insert(node) {
            return false;
        }
        current = parents.get(&node).copied().flatten();
    }

    false
}
