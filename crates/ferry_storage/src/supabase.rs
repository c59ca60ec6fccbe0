//! Source store client for Supabase Storage.

use crate::{build_http_client, path_from_public_url};
use async_trait::async_trait;
use ferry_core::{Credentials, HttpConfig, SourceConfig, StorageInventoryEntry};
use ferry_error::{FerryResult, StorageError, StorageErrorKind};
use ferry_interface::SourceStore;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument};

/// Marker object the storage dashboard drops into empty folders.
const EMPTY_FOLDER_PLACEHOLDER: &str = ".emptyFolderPlaceholder";

#[derive(Debug, Deserialize)]
struct ListedObject {
    name: String,
    /// Null for folder placeholders
    id: Option<String>,
    #[serde(default)]
    metadata: Option<ObjectMetadata>,
}

#[derive(Debug, Deserialize)]
struct ObjectMetadata {
    #[serde(default)]
    size: Option<u64>,
}

/// One bucket of a Supabase project.
///
/// Listing walks every folder recursively and pages through each one;
/// entries with a null `id` are folders and are descended into rather than
/// reported.
#[derive(Clone)]
pub struct SupabaseStorage {
    client: reqwest::Client,
    api_base: String,
    service_key: String,
    bucket: String,
    public_prefix: String,
    page_size: usize,
}

impl std::fmt::Debug for SupabaseStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseStorage")
            .field("api_base", &self.api_base)
            .field("bucket", &self.bucket)
            .field("page_size", &self.page_size)
            .field("service_key", &"<redacted>")
            .finish()
    }
}

impl SupabaseStorage {
    /// Create a client from loaded credentials and settings.
    pub fn from_credentials(
        credentials: &Credentials,
        source: &SourceConfig,
        http: &HttpConfig,
    ) -> FerryResult<Self> {
        let client = build_http_client(http)?;
        Ok(Self::new(
            client,
            &credentials.source_url,
            &credentials.source_service_key,
            source.bucket(),
        )
        .with_page_size(*source.list_page_size()))
    }

    /// Create a client for `bucket` on the project at `project_url`.
    pub fn new(client: reqwest::Client, project_url: &str, service_key: &str, bucket: &str) -> Self {
        let base = project_url.trim_end_matches('/');
        Self {
            client,
            api_base: format!("{}/storage/v1", base),
            service_key: service_key.to_string(),
            bucket: bucket.to_string(),
            public_prefix: format!("{}/storage/v1/object/public/{}/", base, bucket),
            page_size: 1000,
        }
    }

    /// Page size used while listing.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
    }

    async fn list_page(&self, prefix: &str, offset: usize) -> Result<Vec<ListedObject>, StorageError> {
        let url = format!("{}/object/list/{}", self.api_base, self.bucket);
        let body = json!({
            "prefix": prefix,
            "limit": self.page_size,
            "offset": offset,
            "sortBy": { "column": "name", "order": "asc" },
        });

        let response = self
            .authorized(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| StorageError::new(StorageErrorKind::Unavailable(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let kind = if status.is_server_error() {
                StorageErrorKind::Unavailable(format!("HTTP {}: {}", status.as_u16(), text))
            } else {
                StorageErrorKind::List(format!("HTTP {}: {}", status.as_u16(), text))
            };
            return Err(StorageError::new(kind));
        }

        response
            .json::<Vec<ListedObject>>()
            .await
            .map_err(|e| StorageError::new(StorageErrorKind::List(e.to_string())))
    }
}

#[async_trait]
impl SourceStore for SupabaseStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn public_url_prefix(&self) -> &str {
        &self.public_prefix
    }

    fn object_path(&self, url: &str) -> Option<String> {
        path_from_public_url(&self.public_prefix, url)
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn list_objects(&self) -> FerryResult<Vec<StorageInventoryEntry>> {
        let mut entries = Vec::new();
        let mut folders = vec![String::new()];

        while let Some(prefix) = folders.pop() {
            let mut offset = 0;
            loop {
                let page = self.list_page(&prefix, offset).await?;
                let fetched = page.len();

                for object in page {
                    let path = if prefix.is_empty() {
                        object.name.clone()
                    } else {
                        format!("{}/{}", prefix, object.name)
                    };
                    if object.id.is_none() {
                        folders.push(path);
                    } else if object.name != EMPTY_FOLDER_PLACEHOLDER {
                        let size_bytes = object.metadata.and_then(|m| m.size).unwrap_or(0);
                        entries.push(StorageInventoryEntry {
                            object_path: path,
                            size_bytes,
                        });
                    }
                }

                if fetched < self.page_size {
                    break;
                }
                offset += fetched;
            }
            debug!(prefix = %prefix, "Folder listed");
        }

        info!(objects = entries.len(), "Bucket listed");
        Ok(entries)
    }

    #[instrument(skip(self, paths), fields(bucket = %self.bucket, count = paths.len()))]
    async fn delete_objects(&self, paths: &[String]) -> FerryResult<usize> {
        if paths.is_empty() {
            return Ok(0);
        }

        let url = format!("{}/object/{}", self.api_base, self.bucket);
        let response = self
            .authorized(self.client.delete(&url))
            .json(&json!({ "prefixes": paths }))
            .send()
            .await
            .map_err(|e| StorageError::new(StorageErrorKind::Unavailable(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StorageError::new(StorageErrorKind::Delete(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text
            )))
            .into());
        }

        let removed = response
            .json::<Vec<serde_json::Value>>()
            .await
            .map(|v| v.len())
            .unwrap_or(paths.len());

        info!(removed, "Objects deleted");
        Ok(removed)
    }
}
