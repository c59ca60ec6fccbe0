//! Target store client for the Cloudinary upload API.

use crate::{SignatureAlgorithm, build_http_client, client::transport_error, sign_params};
use async_trait::async_trait;
use ferry_core::{Credentials, HttpConfig, TargetConfig};
use ferry_error::{FerryResult, TransferError, TransferErrorKind};
use ferry_interface::{TargetStore, UploadRequest};
use ferry_rate_limit::RequestLimiter;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Signed uploads to a Cloudinary cloud.
///
/// Uploads are form posts to `{api_base}/v1_1/{cloud}/image/upload` carrying
/// the inline file, the folder, a unix timestamp, the API key and the
/// signature over folder and timestamp.
#[derive(Clone)]
pub struct CloudinaryUploader {
    client: reqwest::Client,
    upload_url: String,
    delivery_prefix: String,
    api_key: String,
    api_secret: String,
    algorithm: SignatureAlgorithm,
    limiter: RequestLimiter,
}

impl std::fmt::Debug for CloudinaryUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryUploader")
            .field("upload_url", &self.upload_url)
            .field("delivery_prefix", &self.delivery_prefix)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl CloudinaryUploader {
    /// Create an uploader from loaded credentials and settings.
    pub fn from_credentials(
        credentials: &Credentials,
        target: &TargetConfig,
        http: &HttpConfig,
    ) -> FerryResult<Self> {
        let client = build_http_client(http)?;
        Ok(Self::new(
            client,
            target.api_base(),
            target.delivery_base(),
            &credentials.target_cloud_name,
            &credentials.target_api_key,
            &credentials.target_api_secret,
        )
        .with_limiter(RequestLimiter::per_minute(*http.requests_per_minute())))
    }

    /// Create an uploader against explicit endpoints.
    pub fn new(
        client: reqwest::Client,
        api_base: &str,
        delivery_base: &str,
        cloud_name: &str,
        api_key: &str,
        api_secret: &str,
    ) -> Self {
        Self {
            client,
            upload_url: format!(
                "{}/v1_1/{}/image/upload",
                api_base.trim_end_matches('/'),
                cloud_name
            ),
            delivery_prefix: format!("{}/{}/", delivery_base.trim_end_matches('/'), cloud_name),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            algorithm: SignatureAlgorithm::default(),
            limiter: RequestLimiter::unlimited(),
        }
    }

    /// Sign with a different digest.
    pub fn with_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Pace uploads with `limiter`.
    pub fn with_limiter(mut self, limiter: RequestLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// URL prefix of assets delivered from this cloud.
    pub fn delivery_prefix(&self) -> &str {
        &self.delivery_prefix
    }
}

#[async_trait]
impl TargetStore for CloudinaryUploader {
    #[instrument(skip(self, request), fields(folder = %request.folder, bytes = request.file.len()))]
    async fn upload(&self, request: &UploadRequest) -> FerryResult<String> {
        self.limiter.acquire().await;

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("folder", &request.folder), ("timestamp", &timestamp)],
            &self.api_secret,
            self.algorithm,
        );
        let algorithm = self.algorithm.to_string();

        let mut form = vec![
            ("file", request.file.as_str()),
            ("folder", request.folder.as_str()),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.api_key.as_str()),
            ("signature", signature.as_str()),
        ];
        if self.algorithm != SignatureAlgorithm::Sha1 {
            form.push(("signature_algorithm", algorithm.as_str()));
        }

        let response = self
            .client
            .post(&self.upload_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| transport_error(&e))?;
        let parsed: Option<UploadResponse> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let message = parsed
                .and_then(|r| r.error)
                .map(|e| e.message)
                .unwrap_or(body);
            warn!(status = status.as_u16(), message = %message, "Upload rejected");
            return Err(TransferError::new(TransferErrorKind::UploadRejected {
                status: status.as_u16(),
                message,
            })
            .into());
        }

        let url = parsed.and_then(|r| r.secure_url).ok_or_else(|| {
            TransferError::new(TransferErrorKind::MalformedResponse(
                "response carried no secure_url".to_string(),
            ))
        })?;

        debug!(url = %url, "Upload accepted");
        Ok(url)
    }

    fn owns_url(&self, url: &str) -> bool {
        url.starts_with(&self.delivery_prefix)
    }
}
