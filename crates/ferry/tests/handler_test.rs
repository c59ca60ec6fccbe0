use async_trait::async_trait;
use ferry::{
    AssetTransfer, CollectionSchema, CollectionSpec, ConfigError, Engine, FerryConfig,
    FerryResult, Invocation, MemoryRecordStore, MemorySourceStore, MemoryTargetStore, RetryPolicy,
    handle, handle_json,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const SOURCE: &str = "https://proj.supabase.co/storage/v1/object/public/images/";
const TARGET: &str = "https://res.cloudinary.com/demo/";

#[derive(Debug, Default)]
struct CopyTransfer {
    calls: AtomicUsize,
}

#[async_trait]
impl AssetTransfer for CopyTransfer {
    async fn transfer(&self, source_url: &str, destination_folder: &str) -> FerryResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = source_url.rsplit('/').next().unwrap_or("asset");
        Ok(format!("{}image/upload/{}/{}", TARGET, destination_folder, name))
    }
}

struct Fixture {
    records: MemoryRecordStore,
    source: MemorySourceStore,
    transfer: Arc<CopyTransfer>,
}

impl Fixture {
    async fn new() -> Self {
        let records = MemoryRecordStore::new();
        records
            .insert("articles", json!({ "id": 1, "title": "One", "featured_image": format!("{}news/a.png", SOURCE) }))
            .await;
        records
            .insert("articles", json!({ "id": 2, "title": "Two", "featured_image": format!("{}image/upload/articles/b.png", TARGET) }))
            .await;

        let source = MemorySourceStore::new("images", SOURCE);
        source.insert("news/a.png", 1024).await;
        source.insert("old/orphan.png", 2048).await;

        Self {
            records,
            source,
            transfer: Arc::new(CopyTransfer::default()),
        }
    }

    fn engine(&self) -> FerryResult<Engine> {
        let config = FerryConfig {
            retry: RetryPolicy::none(),
            collections: vec![CollectionSpec::new(
                "articles",
                "articles",
                "articles",
                CollectionSchema::FlatField {
                    field: "featured_image".to_string(),
                },
            )
            .with_label_column("title")],
            ..Default::default()
        };
        Engine::new(
            config,
            Arc::new(self.records.clone()),
            Arc::new(self.source.clone()),
            Arc::new(MemoryTargetStore::new(TARGET)),
            self.transfer.clone(),
        )
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).expect("serialize")
}

#[tokio::test]
async fn test_configuration_error_aborts_before_work() {
    let fixture = Fixture::new().await;
    let response = handle(&Invocation::migrate("articles"), || {
        Err(ConfigError::new("Missing environment variables: CLOUDINARY_API_SECRET").into())
    })
    .await;

    let body = to_json(&response);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap_or_default().contains("CLOUDINARY_API_SECRET"));
    assert!(body["elapsedTime"].is_u64());
    assert_eq!(fixture.transfer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_status_reports_each_collection() {
    let fixture = Fixture::new().await;
    let response = handle(&Invocation::status(), || fixture.engine()).await;

    let body = to_json(&response);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["pendingTotal"], json!(1));
    let articles = &body["collections"][0];
    assert_eq!(articles["collection"], json!("articles"));
    assert_eq!(articles["total"], json!(2));
    assert_eq!(articles["migrated"], json!(1));
    assert_eq!(articles["pending"], json!(1));
}

#[tokio::test]
async fn test_migrate_response_shape() {
    let fixture = Fixture::new().await;
    let response = handle_json(r#"{"mode":"migrate","type":"articles","batchSize":5}"#, || {
        fixture.engine()
    })
    .await;

    let body = to_json(&response);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["migrated"], json!(1));
    assert_eq!(body["errors"], json!(0));
    assert_eq!(body["remaining"], json!(0));
    assert_eq!(body["results"][0]["recordId"], json!("1"));
    assert_eq!(body["results"][0]["status"], json!("success"));
    assert_eq!(
        body["results"][0]["newUrl"],
        json!(format!("{}image/upload/articles/a.png", TARGET))
    );
}

#[tokio::test]
async fn test_unknown_collection_is_reported_not_raised() {
    let fixture = Fixture::new().await;
    let response = handle(&Invocation::migrate("podcasts"), || fixture.engine()).await;

    assert!(!response.success);
    assert!(to_json(&response)["error"].as_str().unwrap_or_default().contains("podcasts"));
}

#[tokio::test]
async fn test_invalid_request_is_reported() {
    let fixture = Fixture::new().await;
    let response = handle_json(r#"{"mode":"explode"}"#, || fixture.engine()).await;
    assert!(!response.success);
}

#[tokio::test]
async fn test_cleanup_defaults_to_dry_run() {
    let fixture = Fixture::new().await;
    let response = handle_json(r#"{"mode":"cleanup"}"#, || fixture.engine()).await;

    let body = to_json(&response);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["bucket"], json!("images"));
    assert_eq!(body["totalFiles"], json!(2));
    assert_eq!(body["unreferencedFiles"], json!(1));
    assert_eq!(body["sampleUnreferencedFiles"], json!(["old/orphan.png"]));
    assert!(fixture.source.deleted().await.is_empty());
}

#[tokio::test]
async fn test_cleanup_refused_while_pending() {
    let fixture = Fixture::new().await;
    let response = handle(&Invocation::cleanup().with_dry_run(false), || fixture.engine()).await;

    assert!(!response.success);
    assert!(to_json(&response)["error"].as_str().unwrap_or_default().contains("pending"));
    assert!(fixture.source.deleted().await.is_empty());
}

#[tokio::test]
async fn test_cleanup_deletes_after_migration_completes() {
    let fixture = Fixture::new().await;
    let migrated = handle(&Invocation::migrate("articles").with_batch_size(10), || fixture.engine()).await;
    assert!(migrated.success);

    let response = handle(&Invocation::cleanup().with_dry_run(false), || fixture.engine()).await;
    let body = to_json(&response);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["deletedCount"], json!(2));
    assert_eq!(body["remainingUnreferenced"], json!(0));
}

#[tokio::test]
async fn test_failed_deletion_reports_counts_and_error() {
    let mut fixture = Fixture::new().await;
    let migrated = handle(&Invocation::migrate("articles").with_batch_size(10), || fixture.engine()).await;
    assert!(migrated.success);
    fixture.source = fixture.source.clone().failing_deletes_after(0);

    let response = handle(&Invocation::cleanup().with_dry_run(false), || fixture.engine()).await;
    let body = to_json(&response);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["deletedCount"], json!(0));
    assert_eq!(body["remainingUnreferenced"], json!(2));
    assert!(body["error"].as_str().unwrap_or_default().contains("deletes disabled"));
}
