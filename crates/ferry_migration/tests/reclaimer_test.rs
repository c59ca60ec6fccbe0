mod common;

use common::*;
use ferry_core::{CleanupConfig, Deadline, ManualClock};
use ferry_database::MemoryRecordStore;
use ferry_migration::{DeletionMode, OrphanReclaimer};
use ferry_storage::MemorySourceStore;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

async fn bucket() -> MemorySourceStore {
    let source = MemorySourceStore::new("images", SOURCE);
    for (path, size) in [
        ("news/a.png", 1_048_576),
        ("news/b.png", 524_288),
        ("stories/c.png", 2_097_152),
        ("old/x.png", 1_048_576),
        ("old/y.png", 1_048_576),
    ] {
        source.insert(path, size).await;
    }
    source
}

async fn records() -> MemoryRecordStore {
    let store = MemoryRecordStore::new();
    store
        .insert("articles", json!({ "id": 1, "featured_image": src("news/a.png"), "content": format!("<img src=\"{}\">", src("news/b.png")) }))
        .await;
    store
        .insert("web_stories", json!({ "id": 1, "slides": [{ "image": src("stories/c.png") }] }))
        .await;
    store
}

fn reclaimer(source: &MemorySourceStore, store: &MemoryRecordStore) -> OrphanReclaimer {
    OrphanReclaimer::new(
        Arc::new(source.clone()),
        Arc::new(store.clone()),
        locator(),
        collections(),
        CleanupConfig::default(),
    )
}

#[tokio::test]
async fn test_dry_run_report_lists_exactly_the_orphans() {
    let source = bucket().await;
    let report = reclaimer(&source, &records().await)
        .report(20)
        .await
        .expect("report");

    assert_eq!(report.bucket, "images");
    assert_eq!(report.total_files, 5);
    assert_eq!(report.referenced_files, 3);
    assert_eq!(report.unreferenced_files, 2);
    assert_eq!(report.sample_unreferenced_files, vec!["old/x.png", "old/y.png"]);
    assert_eq!(report.total_size_mb, 5.5);
    assert_eq!(report.unreferenced_size_mb, 2.0);
    assert_eq!(report.potential_savings_mb, 2.0);
    assert!(source.deleted().await.is_empty());
}

#[tokio::test]
async fn test_report_sample_is_bounded() {
    let source = bucket().await;
    let report = reclaimer(&source, &records().await).report(1).await.expect("report");
    assert_eq!(report.unreferenced_files, 2);
    assert_eq!(report.sample_unreferenced_files.len(), 1);
}

#[tokio::test]
async fn test_pending_reference_is_never_deleted() {
    let source = bucket().await;
    let store = records().await;
    store
        .insert("articles", json!({ "id": 2, "featured_image": src("old/x.png") }))
        .await;

    let reclaimer = reclaimer(&source, &store);
    let orphans = reclaimer.list_orphans().await.expect("orphans");
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].object_path, "old/y.png");

    let outcome = reclaimer
        .delete_orphans(DeletionMode::Execute, 100, &Deadline::new(Duration::from_secs(35)))
        .await
        .expect("delete");
    assert_eq!(outcome.deleted_count, 1);
    assert_eq!(outcome.remaining_unreferenced, 0);
    assert_eq!(source.deleted().await, vec!["old/y.png"]);
    assert!(source.paths().await.contains(&"old/x.png".to_string()));
}

#[tokio::test]
async fn test_dry_run_mode_deletes_nothing() {
    let source = bucket().await;
    let outcome = reclaimer(&source, &records().await)
        .delete_orphans(DeletionMode::default(), 100, &Deadline::new(Duration::from_secs(35)))
        .await
        .expect("dry run");

    assert_eq!(outcome.deleted_count, 0);
    assert_eq!(outcome.remaining_unreferenced, 2);
    assert_eq!(source.paths().await.len(), 5);
}

#[tokio::test]
async fn test_batch_size_limits_deletions() {
    let source = bucket().await;
    let outcome = reclaimer(&source, &records().await)
        .delete_orphans(DeletionMode::Execute, 1, &Deadline::new(Duration::from_secs(35)))
        .await
        .expect("delete");

    assert_eq!(outcome.deleted_count, 1);
    assert_eq!(outcome.remaining_unreferenced, 1);
}

#[tokio::test]
async fn test_exhausted_budget_deletes_nothing() {
    let source = bucket().await;
    let clock = ManualClock::new();
    let deadline = Deadline::with_clock(Arc::new(clock.clone()), Duration::from_secs(35));
    clock.advance(Duration::from_secs(40));

    let outcome = reclaimer(&source, &records().await)
        .delete_orphans(DeletionMode::Execute, 100, &deadline)
        .await
        .expect("delete");

    assert!(outcome.stopped_early);
    assert_eq!(outcome.deleted_count, 0);
    assert_eq!(outcome.remaining_unreferenced, 2);
}

#[tokio::test]
async fn test_failed_sub_batch_keeps_earlier_deletions() {
    let source = bucket().await.failing_deletes_after(1);
    let cleanup: CleanupConfig =
        serde_json::from_value(json!({ "delete_chunk": 1 })).expect("cleanup config");
    let reclaimer = OrphanReclaimer::new(
        Arc::new(source.clone()),
        Arc::new(records().await),
        locator(),
        collections(),
        cleanup,
    );

    let outcome = reclaimer
        .delete_orphans(DeletionMode::Execute, 100, &Deadline::new(Duration::from_secs(35)))
        .await
        .expect("outcome");

    assert_eq!(outcome.deleted_count, 1);
    assert_eq!(outcome.remaining_unreferenced, 1);
    assert!(outcome.stopped_early);
    assert!(outcome.error.as_deref().is_some_and(|e| e.contains("deletes disabled")));
    assert_eq!(source.deleted().await, vec!["old/x.png"]);
}

#[tokio::test]
async fn test_listing_failure_aborts_cleanup() {
    let source = bucket().await.failing();
    let result = reclaimer(&source, &records().await)
        .delete_orphans(DeletionMode::Execute, 100, &Deadline::new(Duration::from_secs(35)))
        .await;

    assert!(result.is_err());
    assert!(source.deleted().await.is_empty());
}
