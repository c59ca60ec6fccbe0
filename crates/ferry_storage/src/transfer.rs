//! The asset transfer unit.

use crate::{ImageFormat, build_http_client, client::transport_error};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ferry_core::HttpConfig;
use ferry_error::{FerryResult, TransferError, TransferErrorKind};
use ferry_interface::{AssetTransfer, TargetStore, UploadRequest};
use ferry_rate_limit::RequestLimiter;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Downloads an asset over HTTP and hands it to a target store inline.
///
/// One GET and one upload per call. The payload travels as a
/// `data:{mime};base64,...` URL so the target needs no access to the source.
/// Nothing is retried here; callers wrap [`AssetTransfer::transfer`] in their
/// own retry policy.
#[derive(Clone)]
pub struct HttpAssetTransfer {
    client: reqwest::Client,
    target: Arc<dyn TargetStore>,
    limiter: RequestLimiter,
}

impl std::fmt::Debug for HttpAssetTransfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAssetTransfer")
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}

impl HttpAssetTransfer {
    /// Create a transfer unit uploading into `target`.
    pub fn new(target: Arc<dyn TargetStore>, http: &HttpConfig) -> FerryResult<Self> {
        Ok(Self {
            client: build_http_client(http)?,
            target,
            limiter: RequestLimiter::per_minute(*http.requests_per_minute()),
        })
    }

    /// Use an existing client.
    pub fn with_client(target: Arc<dyn TargetStore>, client: reqwest::Client) -> Self {
        Self {
            client,
            target,
            limiter: RequestLimiter::unlimited(),
        }
    }

    /// Pace downloads with `limiter`.
    pub fn with_limiter(mut self, limiter: RequestLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    async fn fetch_inline(&self, source_url: &str) -> Result<String, TransferError> {
        self.limiter.acquire().await;

        let response = self
            .client
            .get(source_url)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::new(TransferErrorKind::FetchFailed {
                status: status.as_u16(),
            }));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(|e| transport_error(&e))?;
        let mime = ImageFormat::resolve_mime(content_type.as_deref(), source_url);

        debug!(bytes = bytes.len(), mime = %mime, "Fetched source asset");
        Ok(format!("data:{};base64,{}", mime, STANDARD.encode(&bytes)))
    }
}

#[async_trait]
impl AssetTransfer for HttpAssetTransfer {
    #[instrument(skip(self), fields(folder = %destination_folder))]
    async fn transfer(&self, source_url: &str, destination_folder: &str) -> FerryResult<String> {
        let file = self.fetch_inline(source_url).await?;
        let request = UploadRequest {
            file,
            folder: destination_folder.to_string(),
        };
        let url = self.target.upload(&request).await?;
        debug!(new_url = %url, "Asset transferred");
        Ok(url)
    }
}
