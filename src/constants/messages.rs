// ABOUTME: Outcome and rejection messages for back-office mutations
// ABOUTME: Shared between the hierarchy manager, mailout, and the CLI
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Category created
pub const CATEGORY_CREATED: &str = "Category created.";

/// Category updated
pub const CATEGORY_UPDATED: &str = "Category updated.";

/// Category deleted
pub const CATEGORY_DELETED: &str = "Category deleted.";

/// Bulk reorder applied
pub const CATEGORIES_SORTED: &str = "Categories sorted.";

/// Requested parent is the category itself or one of its descendants
pub const CATEGORY_PARENT_IS_CHILD: &str =
    "A category cannot be moved beneath itself or one of its subcategories.";

/// Deletion blocked by items
pub const CATEGORY_HAS_ITEMS: &str = "A category with items cannot be deleted.";

/// Deletion blocked by subcategories
pub const CATEGORY_HAS_CHILDREN: &str = "A category with subcategories cannot be deleted.";

/// Referenced category does not exist
pub const CATEGORY_NOT_FOUND: &str = "The selected category does not exist.";

/// Mailout status line
#[must_use]
pub fn mailout_sent(count: usize) -> String {
    format!("Mailout sent to {count} recipients.")
}
