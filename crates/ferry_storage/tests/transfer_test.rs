use ferry_core::HttpConfig;
use ferry_error::{FerryErrorKind, RetryableError, TransferErrorKind};
use ferry_interface::AssetTransfer;
use ferry_storage::{HttpAssetTransfer, MemoryTargetStore, build_http_client};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transfer_into(target: &MemoryTargetStore) -> HttpAssetTransfer {
    let client = build_http_client(&HttpConfig::default()).expect("client");
    HttpAssetTransfer::with_client(Arc::new(target.clone()), client)
}

#[tokio::test]
async fn test_transfer_uploads_inline_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/public/images/a.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(vec![1u8, 2, 3]),
        )
        .expect(1)
        .mount(&server)
        .await;

    let target = MemoryTargetStore::new("https://res.cloudinary.com/demo/");
    let transfer = transfer_into(&target);

    let url = transfer
        .transfer(&format!("{}/public/images/a.png", server.uri()), "articles")
        .await
        .expect("transfer");

    assert_eq!(url, "https://res.cloudinary.com/demo/image/upload/articles/asset-1");
    let uploads = target.uploads().await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].folder, "articles");
    assert_eq!(uploads[0].file, "data:image/png;base64,AQID");
}

#[tokio::test]
async fn test_transfer_infers_mime_from_extension() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/photo.jpeg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8]))
        .mount(&server)
        .await;

    let target = MemoryTargetStore::new("https://cdn.test/");
    let transfer = transfer_into(&target);

    transfer
        .transfer(&format!("{}/photo.jpeg", server.uri()), "stories")
        .await
        .expect("transfer");

    let uploads = target.uploads().await;
    assert!(uploads[0].file.starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn test_fetch_failure_reports_status_and_skips_upload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let target = MemoryTargetStore::new("https://cdn.test/");
    let transfer = transfer_into(&target);

    let err = transfer
        .transfer(&format!("{}/missing.png", server.uri()), "articles")
        .await
        .expect_err("404 must fail");

    match err.kind() {
        FerryErrorKind::Transfer(e) => {
            assert_eq!(e.kind, TransferErrorKind::FetchFailed { status: 404 })
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(!err.is_retryable());
    assert!(target.uploads().await.is_empty());
}

#[tokio::test]
async fn test_server_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let target = MemoryTargetStore::new("https://cdn.test/");
    let transfer = transfer_into(&target);

    let err = transfer
        .transfer(&format!("{}/x.png", server.uri()), "articles")
        .await
        .expect_err("503 must fail");
    assert!(err.is_retryable());
}
