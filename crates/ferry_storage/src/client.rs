//! Shared HTTP client construction.

use ferry_core::HttpConfig;
use ferry_error::{FerryResult, HttpError, TransferError, TransferErrorKind};

/// Build a client with the configured per-request timeout.
///
/// A hung fetch would otherwise outlive the invocation budget; the budget
/// itself is only checked between items.
pub fn build_http_client(config: &HttpConfig) -> FerryResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("ferry/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)).into())
}

/// Classify a transport-level reqwest failure.
#[track_caller]
pub(crate) fn transport_error(e: &reqwest::Error) -> TransferError {
    if e.is_timeout() {
        TransferError::new(TransferErrorKind::Timeout(e.to_string()))
    } else {
        TransferError::new(TransferErrorKind::Network(e.to_string()))
    }
}
