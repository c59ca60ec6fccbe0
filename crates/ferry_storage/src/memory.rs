//! In-process stores.
//!
//! Used by the test suites and by dry runs that should never touch a real
//! bucket or CDN.

use crate::path_from_public_url;
use async_trait::async_trait;
use ferry_core::StorageInventoryEntry;
use ferry_error::{FerryResult, StorageError, StorageErrorKind};
use ferry_interface::{SourceStore, TargetStore, UploadRequest};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Source store backed by a map of object path to size.
#[derive(Debug, Clone)]
pub struct MemorySourceStore {
    bucket: String,
    public_prefix: String,
    objects: Arc<RwLock<BTreeMap<String, u64>>>,
    deleted: Arc<RwLock<Vec<String>>>,
    fail_listing: bool,
    /// Delete calls that succeed before every further one fails
    delete_calls_allowed: Option<usize>,
    delete_calls: Arc<AtomicUsize>,
}

impl MemorySourceStore {
    /// Empty bucket served under `public_prefix`.
    pub fn new(bucket: impl Into<String>, public_prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            public_prefix: public_prefix.into(),
            objects: Arc::new(RwLock::new(BTreeMap::new())),
            deleted: Arc::new(RwLock::new(Vec::new())),
            fail_listing: false,
            delete_calls_allowed: None,
            delete_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A store whose listing always fails.
    pub fn failing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// A store whose delete calls fail after the first `calls` succeed.
    pub fn failing_deletes_after(mut self, calls: usize) -> Self {
        self.delete_calls_allowed = Some(calls);
        self
    }

    /// Add an object.
    pub async fn insert(&self, path: impl Into<String>, size_bytes: u64) {
        self.objects.write().await.insert(path.into(), size_bytes);
    }

    /// Public URL of an object path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.public_prefix, path)
    }

    /// Paths currently present.
    pub async fn paths(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    /// Every path removed so far, in deletion order.
    pub async fn deleted(&self) -> Vec<String> {
        self.deleted.read().await.clone()
    }
}

#[async_trait]
impl SourceStore for MemorySourceStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn public_url_prefix(&self) -> &str {
        &self.public_prefix
    }

    fn object_path(&self, url: &str) -> Option<String> {
        path_from_public_url(&self.public_prefix, url)
    }

    async fn list_objects(&self) -> FerryResult<Vec<StorageInventoryEntry>> {
        if self.fail_listing {
            return Err(StorageError::new(StorageErrorKind::List("listing disabled".to_string())).into());
        }
        Ok(self
            .objects
            .read()
            .await
            .iter()
            .map(|(path, size)| StorageInventoryEntry {
                object_path: path.clone(),
                size_bytes: *size,
            })
            .collect())
    }

    async fn delete_objects(&self, paths: &[String]) -> FerryResult<usize> {
        let call = self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.delete_calls_allowed.is_some_and(|allowed| call >= allowed) {
            return Err(StorageError::new(StorageErrorKind::Delete("deletes disabled".to_string())).into());
        }
        let mut objects = self.objects.write().await;
        let mut deleted = self.deleted.write().await;
        let mut removed = 0;
        for path in paths {
            if objects.remove(path).is_some() {
                deleted.push(path.clone());
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Target store that records uploads and mints sequential URLs.
#[derive(Debug, Clone)]
pub struct MemoryTargetStore {
    delivery_prefix: String,
    uploads: Arc<RwLock<Vec<UploadRequest>>>,
}

impl MemoryTargetStore {
    /// Store whose URLs start with `delivery_prefix`.
    pub fn new(delivery_prefix: impl Into<String>) -> Self {
        Self {
            delivery_prefix: delivery_prefix.into(),
            uploads: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Uploads received so far.
    pub async fn uploads(&self) -> Vec<UploadRequest> {
        self.uploads.read().await.clone()
    }
}

#[async_trait]
impl TargetStore for MemoryTargetStore {
    async fn upload(&self, request: &UploadRequest) -> FerryResult<String> {
        let mut uploads = self.uploads.write().await;
        uploads.push(request.clone());
        Ok(format!(
            "{}image/upload/{}/asset-{}",
            self.delivery_prefix,
            request.folder,
            uploads.len()
        ))
    }

    fn owns_url(&self, url: &str) -> bool {
        url.starts_with(&self.delivery_prefix)
    }
}
