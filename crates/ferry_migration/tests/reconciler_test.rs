mod common;

use common::*;
use ferry_core::StatusUnit;
use ferry_database::MemoryRecordStore;
use ferry_migration::StatusReconciler;
use serde_json::json;
use std::sync::Arc;

fn reconciler(store: &MemoryRecordStore, page_size: usize) -> StatusReconciler {
    StatusReconciler::new(
        Arc::new(store.clone()),
        target_store(),
        locator(),
        collections(),
        page_size,
    )
}

#[tokio::test]
async fn test_flat_status_counts_records() {
    let store = MemoryRecordStore::new();
    for id in 1..=10 {
        let url = if id <= 6 {
            tgt(&format!("articles/{}.png", id))
        } else {
            src(&format!("news/{}.png", id))
        };
        store
            .insert("articles", json!({ "id": id, "featured_image": url }))
            .await;
    }

    // Page size below the row count exercises paging.
    let status = reconciler(&store, 3).status("articles").await.expect("status");
    assert_eq!(status.unit, StatusUnit::Records);
    assert_eq!(status.total, 10);
    assert_eq!(status.migrated, 6);
    assert_eq!(status.pending, 4);
    assert_eq!(status.unmanaged, 0);
}

#[tokio::test]
async fn test_flat_status_ignores_empty_and_tracks_foreign_urls() {
    let store = MemoryRecordStore::new();
    store.insert("articles", json!({ "id": 1, "featured_image": null })).await;
    store.insert("articles", json!({ "id": 2, "featured_image": "" })).await;
    store
        .insert("articles", json!({ "id": 3, "featured_image": "https://images.unsplash.com/x.jpg" }))
        .await;

    let status = reconciler(&store, 100).status("articles").await.expect("status");
    assert_eq!(status.total, 1);
    assert_eq!(status.unmanaged, 1);
    assert_eq!(status.pending, 0);
}

#[tokio::test]
async fn test_array_and_text_status_count_assets() {
    let store = MemoryRecordStore::new();
    store
        .insert(
            "web_stories",
            json!({ "id": 1, "slides": [{ "image": src("a.png") }, { "image": tgt("b.png") }, { "image": src("c.png") }] }),
        )
        .await;
    store
        .insert(
            "articles",
            json!({ "id": 1, "content": format!("{} <a href=\"https://example.com/about\">x</a> {}", src("d.png"), tgt("e.png")) }),
        )
        .await;

    let reconciler = reconciler(&store, 100);
    let stories = reconciler.status("stories").await.expect("stories");
    assert_eq!(stories.unit, StatusUnit::Assets);
    assert_eq!((stories.total, stories.migrated, stories.pending), (3, 1, 2));

    let content = reconciler.status("article_content").await.expect("content");
    assert_eq!((content.total, content.migrated, content.pending), (2, 1, 1));

    assert_eq!(reconciler.pending_total().await.expect("pending"), 3);
}

#[tokio::test]
async fn test_status_all_follows_configuration_order() {
    let store = MemoryRecordStore::new();
    let statuses = reconciler(&store, 10).status_all().await.expect("status");
    let names: Vec<_> = statuses.iter().map(|s| s.collection.as_str()).collect();
    assert_eq!(names, vec!["articles", "article_content", "stories"]);
    assert!(statuses.iter().all(|s| s.total == 0));
}
