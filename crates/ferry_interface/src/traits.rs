//! Trait definitions for the external systems the engine drives.

use crate::{Record, RecordQuery};
use async_trait::async_trait;
use ferry_core::StorageInventoryEntry;
use ferry_error::FerryResult;
use serde_json::{Map, Value as JsonValue};

/// The content database.
///
/// Every call reads the store fresh; implementations must not cache rows
/// between calls because records mutate between runs.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch the rows selected by `query`.
    async fn fetch(&self, query: &RecordQuery) -> FerryResult<Vec<Record>>;

    /// Count the rows selected by `query`, ignoring its paging.
    async fn count(&self, query: &RecordQuery) -> FerryResult<u64>;

    /// Overwrite the given columns of one row.
    ///
    /// The update is a single write; either every column changes or none does.
    async fn update_fields(
        &self,
        table: &str,
        id_column: &str,
        id: &str,
        fields: &Map<String, JsonValue>,
    ) -> FerryResult<()>;
}

/// The object store assets are migrated away from.
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Bucket name, for reporting.
    fn bucket(&self) -> &str;

    /// Public URL prefix every object URL of this store starts with.
    fn public_url_prefix(&self) -> &str;

    /// Object path addressed by a public URL, or `None` for foreign URLs.
    fn object_path(&self, url: &str) -> Option<String>;

    /// List every object physically present, walking folders recursively.
    async fn list_objects(&self) -> FerryResult<Vec<StorageInventoryEntry>>;

    /// Delete the given objects, returning how many the store removed.
    async fn delete_objects(&self, paths: &[String]) -> FerryResult<usize>;
}

/// One upload to the target store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Inline payload, a `data:{mime};base64,...` URL
    pub file: String,
    /// Destination folder
    pub folder: String,
}

/// The CDN assets are migrated to.
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Store the payload and return its canonical delivery URL.
    ///
    /// A single call is atomic from the store's perspective.
    async fn upload(&self, request: &UploadRequest) -> FerryResult<String>;

    /// True when `url` is served by this store.
    fn owns_url(&self, url: &str) -> bool;
}

/// Fetch one asset from its source URL and store it in the target.
///
/// Implementations perform exactly one download and one upload per call and
/// keep no state, so a caller may retry freely.
#[async_trait]
pub trait AssetTransfer: Send + Sync {
    /// Move the asset and return its target-store URL.
    async fn transfer(&self, source_url: &str, destination_folder: &str) -> FerryResult<String>;
}
