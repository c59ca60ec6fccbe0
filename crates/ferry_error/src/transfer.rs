//! Asset transfer error types.

/// Failure conditions of a single fetch-then-upload round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum TransferErrorKind {
    /// The source store answered the download with a non-success status
    #[display("Fetch failed with HTTP {}", status)]
    FetchFailed {
        /// HTTP status returned by the source
        status: u16,
    },
    /// Connection-level failure before a status was received
    #[display("Network error: {}", _0)]
    Network(String),
    /// The per-request timeout elapsed
    #[display("Request timed out: {}", _0)]
    Timeout(String),
    /// The target store refused the upload
    #[display("Upload rejected with HTTP {}: {}", status, message)]
    UploadRejected {
        /// HTTP status returned by the target
        status: u16,
        /// Error body or message returned by the target
        message: String,
    },
    /// The target store answered with a body we could not interpret
    #[display("Malformed upload response: {}", _0)]
    MalformedResponse(String),
}

impl TransferErrorKind {
    /// Check if this failure is transient and worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransferErrorKind::FetchFailed { status }
            | TransferErrorKind::UploadRejected { status, .. } => {
                matches!(*status, 408 | 429 | 500 | 502 | 503 | 504)
            }
            TransferErrorKind::Network(_) => true,
            TransferErrorKind::Timeout(_) => true,
            TransferErrorKind::MalformedResponse(_) => false,
        }
    }
}

/// Transfer error with location tracking.
///
/// # Examples
///
/// ```
/// use ferry_error::{TransferError, TransferErrorKind};
///
/// let err = TransferError::new(TransferErrorKind::FetchFailed { status: 404 });
/// assert!(format!("{}", err).contains("HTTP 404"));
/// assert_eq!(err.status(), Some(404));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Transfer Error: {} at line {} in {}", kind, line, file)]
pub struct TransferError {
    /// The kind of error that occurred
    pub kind: TransferErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl TransferError {
    /// Create a new TransferError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TransferErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// HTTP status carried by the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            TransferErrorKind::FetchFailed { status }
            | TransferErrorKind::UploadRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl crate::RetryableError for TransferError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
