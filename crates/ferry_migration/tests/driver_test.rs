mod common;

use common::*;
use ferry_core::ManualClock;
use ferry_database::MemoryRecordStore;
use ferry_migration::drive_with_clock;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_drive_stops_after_two_idle_invocations() {
    let store = MemoryRecordStore::new();
    for id in 1..=5 {
        let name = if id == 3 { "broken.png".to_string() } else { format!("{}.png", id) };
        store
            .insert("articles", json!({ "id": id, "featured_image": src(&name) }))
            .await;
    }

    let migrator = migrator(&store, Arc::new(ScriptedTransfer::new()));
    let summary = drive_with_clock(
        &migrator,
        "articles",
        2,
        Duration::from_secs(35),
        Arc::new(ManualClock::new()),
    )
    .await
    .expect("drive");

    assert_eq!(summary.migrated, 4);
    assert_eq!(summary.remaining, 1);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].record_id, "3");
    assert_eq!(summary.invocations, 5);
}

#[tokio::test]
async fn test_drive_finishes_when_nothing_remains() {
    let store = MemoryRecordStore::new();
    for id in 1..=3 {
        store
            .insert("articles", json!({ "id": id, "featured_image": src(&format!("{}.png", id)) }))
            .await;
    }

    let migrator = migrator(&store, Arc::new(ScriptedTransfer::new()));
    let summary = drive_with_clock(
        &migrator,
        "articles",
        1,
        Duration::from_secs(35),
        Arc::new(ManualClock::new()),
    )
    .await
    .expect("drive");

    assert_eq!(summary.migrated, 3);
    assert_eq!(summary.remaining, 0);
    assert_eq!(summary.invocations, 3);
    assert!(summary.errors.is_empty());
}
