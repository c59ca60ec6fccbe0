//! Top-level error wrapper types.

use crate::{
    ConfigError, HttpError, MigrationError, RecordError, RetryableError, StorageError,
    TransferError,
};

/// Every error family a Ferry operation can surface.
///
/// # Examples
///
/// ```
/// use ferry_error::{FerryError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: FerryError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum FerryErrorKind {
    /// Configuration or credential error
    #[from(ConfigError)]
    Config(ConfigError),
    /// HTTP client error
    #[from(HttpError)]
    Http(HttpError),
    /// Asset transfer error
    #[from(TransferError)]
    Transfer(TransferError),
    /// Source store error
    #[from(StorageError)]
    Storage(StorageError),
    /// Record store error
    #[from(RecordError)]
    Record(RecordError),
    /// Orchestration error
    #[from(MigrationError)]
    Migration(MigrationError),
}

/// Ferry error with kind discrimination.
///
/// # Examples
///
/// ```
/// use ferry_error::{ConfigError, FerryResult};
///
/// fn might_fail() -> FerryResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(err.is_configuration());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Ferry Error: {}", _0)]
pub struct FerryError(Box<FerryErrorKind>);

impl FerryError {
    /// Create a new error from a kind.
    pub fn new(kind: FerryErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &FerryErrorKind {
        &self.0
    }

    /// True for errors that must abort an invocation before any work starts.
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind(), FerryErrorKind::Config(_))
    }
}

impl<T> From<T> for FerryError
where
    T: Into<FerryErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

impl RetryableError for FerryError {
    fn is_retryable(&self) -> bool {
        match self.kind() {
            FerryErrorKind::Transfer(e) => e.is_retryable(),
            FerryErrorKind::Storage(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Result type for Ferry operations.
pub type FerryResult<T> = std::result::Result<T, FerryError>;
