//! Source store error types.

/// Kinds of object storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Listing the bucket failed
    #[display("Failed to list objects: {}", _0)]
    List(String),
    /// Deleting objects failed
    #[display("Failed to delete objects: {}", _0)]
    Delete(String),
    /// URL or object path could not be interpreted
    #[display("Invalid object path: {}", _0)]
    InvalidPath(String),
    /// Storage backend is unavailable
    #[display("Storage unavailable: {}", _0)]
    Unavailable(String),
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use ferry_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::List("HTTP 401".to_string()));
/// assert!(format!("{}", err).contains("list objects"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl crate::RetryableError for StorageError {
    fn is_retryable(&self) -> bool {
        matches!(self.kind, StorageErrorKind::Unavailable(_))
    }
}
