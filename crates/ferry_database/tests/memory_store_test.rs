use ferry_database::MemoryRecordStore;
use ferry_interface::{RecordQuery, RecordStore};
use serde_json::{Map, json};

async fn seeded() -> MemoryRecordStore {
    let store = MemoryRecordStore::new();
    for (id, image) in [
        (10, json!("https://old.example/images/a.png")),
        (2, json!("https://cdn.example/demo/b.png")),
        (7, json!("https://old.example/images/c.png")),
        (3, json!(null)),
    ] {
        store
            .insert("articles", json!({ "id": id, "title": format!("Post {}", id), "featured_image": image }))
            .await;
    }
    store
}

#[tokio::test]
async fn test_fetch_orders_by_numeric_id() {
    let store = seeded().await;
    let query = RecordQuery::builder().table("articles").build().expect("query");

    let ids: Vec<String> = store.fetch(&query).await.expect("fetch").into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["2", "3", "7", "10"]);
}

#[tokio::test]
async fn test_contains_filter_and_count() {
    let store = seeded().await;
    let query = RecordQuery::builder()
        .table("articles")
        .contains(("featured_image".to_string(), "https://old.example/".to_string()))
        .build()
        .expect("query");

    assert_eq!(store.count(&query).await.expect("count"), 2);
    let page = store.fetch(&query.page(1, 1)).await.expect("fetch");
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, "10");
}

#[tokio::test]
async fn test_contains_matches_nested_json() {
    let store = MemoryRecordStore::new();
    store
        .insert(
            "web_stories",
            json!({ "id": "s1", "slides": [{ "image": "https://old.example/images/x.png" }] }),
        )
        .await;
    let query = RecordQuery::builder()
        .table("web_stories")
        .contains(("slides".to_string(), "https://old.example/".to_string()))
        .build()
        .expect("query");

    assert_eq!(store.count(&query).await.expect("count"), 1);
}

#[tokio::test]
async fn test_column_projection_keeps_id() {
    let store = seeded().await;
    let query = RecordQuery::builder()
        .table("articles")
        .columns(vec!["featured_image".to_string()])
        .limit(1usize)
        .build()
        .expect("query");

    let records = store.fetch(&query).await.expect("fetch");
    assert_eq!(records[0].id, "2");
    assert!(records[0].get("title").is_none());
}

#[tokio::test]
async fn test_update_fields_and_missing_row() {
    let store = seeded().await;
    let mut fields = Map::new();
    fields.insert("featured_image".to_string(), json!("https://cdn.example/demo/a.png"));

    store
        .update_fields("articles", "id", "10", &fields)
        .await
        .expect("update");
    let row = store.row("articles", "id", "10").await.expect("row");
    assert_eq!(row["featured_image"], json!("https://cdn.example/demo/a.png"));

    assert!(store.update_fields("articles", "id", "999", &fields).await.is_err());
}

#[tokio::test]
async fn test_rejected_updates_fail() {
    let store = seeded().await;
    store.reject_updates_for("7").await;
    let mut fields = Map::new();
    fields.insert("featured_image".to_string(), json!("x"));

    assert!(store.update_fields("articles", "id", "7", &fields).await.is_err());
    let row = store.row("articles", "id", "7").await.expect("row");
    assert_eq!(row["featured_image"], json!("https://old.example/images/c.png"));
}
