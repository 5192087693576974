// ABOUTME: Integration tests for the category hierarchy manager over SQLite
// ABOUTME: Cycle rejection, deletion guards, child policies, bulk ordering and validation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use common::{create_category, create_test_hierarchy, list_item, parent_links};
use marketplace_admin::{
    constants::fields,
    database::CategoryStore,
    errors::ErrorCode,
    hierarchy::ChildPolicy,
    models::{CategoryUpdate, NewCategory},
};
use std::collections::{BTreeMap, HashSet};

fn reparent(id: i64, slug: &str, parent_id: Option<i64>) -> CategoryUpdate {
    CategoryUpdate {
        id,
        name: slug.to_uppercase(),
        slug: slug.to_owned(),
        parent_id,
    }
}

#[tokio::test]
async fn test_reparent_under_grandchild_is_rejected() -> Result<()> {
    let (_db, hierarchy) = create_test_hierarchy(ChildPolicy::default()).await?;

    let a = create_category(&hierarchy, "a", None).await?;
    let b = create_category(&hierarchy, "b", Some(a.id)).await?;
    let c = create_category(&hierarchy, "c", Some(b.id)).await?;
    let before = parent_links(&hierarchy).await?;

    let err = hierarchy
        .update_category(reparent(a.id, "a", Some(c.id)))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::HierarchyCycle);
    assert_eq!(err.field(), Some(fields::PARENT_CATEGORY_ID));
    assert_eq!(parent_links(&hierarchy).await?, before);
    assert_eq!(
        before,
        vec![(a.id, None), (b.id, Some(a.id)), (c.id, Some(b.id))]
    );
    Ok(())
}

#[tokio::test]
async fn test_every_descendant_is_rejected_as_parent() -> Result<()> {
    let (_db, hierarchy) = create_test_hierarchy(ChildPolicy::default()).await?;

    // root -> (left -> (ll, lr -> lrl), right)
    let root = create_category(&hierarchy, "root", None).await?;
    let left = create_category(&hierarchy, "left", Some(root.id)).await?;
    let right = create_category(&hierarchy, "right", Some(root.id)).await?;
    let ll = create_category(&hierarchy, "ll", Some(left.id)).await?;
    let lr = create_category(&hierarchy, "lr", Some(left.id)).await?;
    let lrl = create_category(&hierarchy, "lrl", Some(lr.id)).await?;

    let descendants = hierarchy.descendant_ids(root.id).await?;
    assert_eq!(
        descendants,
        HashSet::from([left.id, right.id, ll.id, lr.id, lrl.id])
    );
    assert!(!descendants.contains(&root.id));

    let before = parent_links(&hierarchy).await?;
    for candidate in descendants {
        let err = hierarchy
            .update_category(reparent(root.id, "root", Some(candidate)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::HierarchyCycle, "parent {candidate}");
        assert_eq!(parent_links(&hierarchy).await?, before);
    }

    assert!(hierarchy.is_descendant_of(lrl.id, root.id).await?);
    assert!(!hierarchy.is_descendant_of(right.id, left.id).await?);
    Ok(())
}

#[tokio::test]
async fn test_self_parenting_is_a_cycle() -> Result<()> {
    let (_db, hierarchy) = create_test_hierarchy(ChildPolicy::default()).await?;
    let a = create_category(&hierarchy, "a", None).await?;

    let err = hierarchy
        .update_category(reparent(a.id, "a", Some(a.id)))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::HierarchyCycle);
    assert_eq!(hierarchy.find_category(a.id).await?.unwrap().parent_id, None);
    Ok(())
}

#[tokio::test]
async fn test_valid_reparent_updates_all_fields() -> Result<()> {
    let (_db, hierarchy) = create_test_hierarchy(ChildPolicy::default()).await?;
    let a = create_category(&hierarchy, "a", None).await?;
    let b = create_category(&hierarchy, "b", None).await?;

    let updated = hierarchy
        .update_category(CategoryUpdate {
            id: b.id,
            name: "  Fiction ".to_owned(),
            slug: "fiction".to_owned(),
            parent_id: Some(a.id),
        })
        .await?;

    assert_eq!(updated.name, "Fiction");
    assert_eq!(updated.slug, "fiction");
    assert_eq!(updated.parent_id, Some(a.id));
    assert_eq!(hierarchy.find_category(b.id).await?, Some(updated));

    // Moving back to the root level is always allowed
    let root = hierarchy.update_category(reparent(b.id, "b", None)).await?;
    assert_eq!(root.parent_id, None);
    Ok(())
}

#[tokio::test]
async fn test_store_rechecks_cycle_inside_transaction() -> Result<()> {
    let (db, hierarchy) = create_test_hierarchy(ChildPolicy::default()).await?;
    let a = create_category(&hierarchy, "a", None).await?;
    let b = create_category(&hierarchy, "b", Some(a.id)).await?;
    let before = parent_links(&hierarchy).await?;

    // Bypass the manager: the store's own ancestor walk must still refuse
    let err = db
        .update_category(&reparent(a.id, "a", Some(b.id)))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::HierarchyCycle);
    assert_eq!(parent_links(&hierarchy).await?, before);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_swaps_cannot_both_commit() -> Result<()> {
    let (_db, hierarchy) = create_test_hierarchy(ChildPolicy::default()).await?;
    let a = create_category(&hierarchy, "a", None).await?;
    let b = create_category(&hierarchy, "b", None).await?;

    let (first, second) = tokio::join!(
        hierarchy.update_category(reparent(a.id, "a", Some(b.id))),
        hierarchy.update_category(reparent(b.id, "b", Some(a.id))),
    );

    assert!(first.is_ok() != second.is_ok());
    let failure = first.err().or(second.err()).unwrap();
    assert_eq!(failure.code, ErrorCode::HierarchyCycle);
    Ok(())
}

#[tokio::test]
async fn test_create_validates_input() -> Result<()> {
    let (_db, hierarchy) = create_test_hierarchy(ChildPolicy::default()).await?;

    let err = hierarchy
        .create_category(NewCategory::root("   ", "books"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);
    assert_eq!(err.field(), Some(fields::NAME));

    let err = hierarchy
        .create_category(NewCategory::root("Books", ""))
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some(fields::SLUG));

    let err = hierarchy
        .create_category(NewCategory::child("Books", "books", 404))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert_eq!(err.field(), Some(fields::PARENT_CATEGORY_ID));

    assert!(hierarchy.list_categories().await?.is_empty());

    let created = hierarchy
        .create_category(NewCategory::root(" Books ", " books "))
        .await?;
    assert_eq!((created.name.as_str(), created.slug.as_str()), ("Books", "books"));
    assert_eq!(created.sort, 0);
    Ok(())
}

#[tokio::test]
async fn test_update_unknown_category_or_parent() -> Result<()> {
    let (_db, hierarchy) = create_test_hierarchy(ChildPolicy::default()).await?;
    let a = create_category(&hierarchy, "a", None).await?;

    let err = hierarchy
        .update_category(reparent(999, "ghost", None))
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some(fields::CATEGORY_ID));

    let err = hierarchy
        .update_category(reparent(a.id, "a", Some(999)))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert_eq!(err.field(), Some(fields::PARENT_CATEGORY_ID));
    Ok(())
}

#[tokio::test]
async fn test_delete_with_items_is_rejected() -> Result<()> {
    let (db, hierarchy) = create_test_hierarchy(ChildPolicy::default()).await?;
    let books = create_category(&hierarchy, "books", None).await?;
    list_item(&db, "seller", Some(books.id), 1_700_000_000).await?;

    let err = hierarchy.delete_category(books.id).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ResourceInUse);
    assert_eq!(err.field(), Some(fields::CATEGORY_ID));
    assert!(hierarchy.find_category(books.id).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_delete_empty_category() -> Result<()> {
    let (db, hierarchy) = create_test_hierarchy(ChildPolicy::default()).await?;
    let books = create_category(&hierarchy, "books", None).await?;
    let music = create_category(&hierarchy, "music", None).await?;
    list_item(&db, "seller", Some(music.id), 1_700_000_000).await?;

    hierarchy.delete_category(books.id).await?;

    assert!(hierarchy.find_category(books.id).await?.is_none());
    assert!(hierarchy.find_category(music.id).await?.is_some());

    let err = hierarchy.delete_category(books.id).await.unwrap_err();
    assert_eq!(err.field(), Some(fields::CATEGORY_ID));
    Ok(())
}

#[tokio::test]
async fn test_delete_orphans_children_to_root() -> Result<()> {
    let (_db, hierarchy) = create_test_hierarchy(ChildPolicy::OrphanToRoot).await?;
    let a = create_category(&hierarchy, "a", None).await?;
    let b = create_category(&hierarchy, "b", Some(a.id)).await?;
    let c = create_category(&hierarchy, "c", Some(b.id)).await?;
    let d = create_category(&hierarchy, "d", Some(c.id)).await?;

    hierarchy.delete_category(b.id).await?;

    // Only direct children move; grandchildren keep their parent
    assert_eq!(
        parent_links(&hierarchy).await?,
        vec![(a.id, None), (c.id, None), (d.id, Some(c.id))]
    );
    Ok(())
}

#[tokio::test]
async fn test_delete_with_children_rejected_under_reject_policy() -> Result<()> {
    let (_db, hierarchy) = create_test_hierarchy(ChildPolicy::Reject).await?;
    let a = create_category(&hierarchy, "a", None).await?;
    let b = create_category(&hierarchy, "b", Some(a.id)).await?;

    let err = hierarchy.delete_category(a.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceInUse);
    assert_eq!(err.field(), Some(fields::CATEGORY_ID));
    assert_eq!(
        parent_links(&hierarchy).await?,
        vec![(a.id, None), (b.id, Some(a.id))]
    );

    hierarchy.delete_category(b.id).await?;
    hierarchy.delete_category(a.id).await?;
    assert!(hierarchy.list_categories().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_sort_orders_listing() -> Result<()> {
    let (_db, hierarchy) = create_test_hierarchy(ChildPolicy::default()).await?;
    let a = create_category(&hierarchy, "a", None).await?;
    let b = create_category(&hierarchy, "b", None).await?;

    hierarchy
        .sort_categories(&BTreeMap::from([(a.id, 2), (b.id, 1)]))
        .await?;

    let slugs: Vec<String> = hierarchy
        .list_categories()
        .await?
        .into_iter()
        .map(|summary| summary.category.slug)
        .collect();
    assert_eq!(slugs, vec!["b", "a"]);
    Ok(())
}

#[tokio::test]
async fn test_sort_ties_fall_back_to_id() -> Result<()> {
    let (_db, hierarchy) = create_test_hierarchy(ChildPolicy::default()).await?;
    let a = create_category(&hierarchy, "a", None).await?;
    let b = create_category(&hierarchy, "b", None).await?;
    let c = create_category(&hierarchy, "c", None).await?;

    hierarchy
        .sort_categories(&BTreeMap::from([(a.id, 5), (b.id, 1), (c.id, 1)]))
        .await?;

    let ids: Vec<i64> = hierarchy
        .list_categories()
        .await?
        .iter()
        .map(|summary| summary.category.id)
        .collect();
    assert_eq!(ids, vec![b.id, c.id, a.id]);
    Ok(())
}

#[tokio::test]
async fn test_sort_is_all_or_nothing() -> Result<()> {
    let (_db, hierarchy) = create_test_hierarchy(ChildPolicy::default()).await?;
    let a = create_category(&hierarchy, "a", None).await?;
    let b = create_category(&hierarchy, "b", None).await?;

    let err = hierarchy
        .sort_categories(&BTreeMap::from([(a.id, 7), (b.id, 8), (9999, 1)]))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert_eq!(err.field(), Some(fields::CATEGORIES));
    assert_eq!(err.context.details["unknown_category_id"], 9999);
    for summary in hierarchy.list_categories().await? {
        assert_eq!(summary.category.sort, 0);
    }

    let err = hierarchy
        .sort_categories(&BTreeMap::new())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);
    Ok(())
}

#[tokio::test]
async fn test_listing_reports_live_item_counts() -> Result<()> {
    let (db, hierarchy) = create_test_hierarchy(ChildPolicy::default()).await?;
    let books = create_category(&hierarchy, "books", None).await?;
    let music = create_category(&hierarchy, "music", None).await?;
    list_item(&db, "alice", Some(books.id), 1_700_000_000).await?;
    list_item(&db, "bob", Some(books.id), 1_700_000_100).await?;

    let counts: Vec<(String, i64)> = hierarchy
        .list_categories()
        .await?
        .into_iter()
        .map(|summary| (summary.category.slug, summary.item_count))
        .collect();
    assert_eq!(
        counts,
        vec![("books".to_owned(), 2), ("music".to_owned(), 0)]
    );
    assert_eq!(db.count_items_in_category(music.id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_corrupt_cycle_is_tolerated() -> Result<()> {
    let (db, hierarchy) = create_test_hierarchy(ChildPolicy::default()).await?;
    let x = create_category(&hierarchy, "x", None).await?;
    let y = create_category(&hierarchy, "y", None).await?;
    let z = create_category(&hierarchy, "z", None).await?;

    // Simulate external corruption: x and y parent each other
    sqlx::query("UPDATE categories SET parent_id = $1 WHERE id = $2")
        .bind(y.id)
        .bind(x.id)
        .execute(db.pool())
        .await?;
    sqlx::query("UPDATE categories SET parent_id = $1 WHERE id = $2")
        .bind(x.id)
        .bind(y.id)
        .execute(db.pool())
        .await?;

    assert_eq!(hierarchy.descendant_ids(x.id).await?, HashSet::from([y.id]));

    // Attaching an unrelated node beneath the loop terminates and succeeds
    let moved = hierarchy
        .update_category(reparent(z.id, "z", Some(x.id)))
        .await?;
    assert_eq!(moved.parent_id, Some(x.id));

    let err = hierarchy
        .update_category(reparent(y.id, "y", Some(x.id)))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::HierarchyCycle);
    Ok(())
}
