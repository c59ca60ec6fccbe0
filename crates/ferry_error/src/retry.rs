//! Retry classification shared by every fallible network operation.

/// Trait for errors that support retry logic.
///
/// # Examples
///
/// ```
/// use ferry_error::{RetryableError, TransferError, TransferErrorKind};
///
/// let err = TransferError::new(TransferErrorKind::FetchFailed { status: 429 });
/// assert!(err.is_retryable());
///
/// let err = TransferError::new(TransferErrorKind::FetchFailed { status: 404 });
/// assert!(!err.is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Rate limiting (429), gateway/server errors (5xx), network failures and
    /// timeouts return true. A 404 or a rejected payload never will.
    fn is_retryable(&self) -> bool;
}
