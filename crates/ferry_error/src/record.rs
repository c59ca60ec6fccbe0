//! Record store error types.

/// Record store error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum RecordErrorKind {
    /// Connection failed
    #[display("Record store connection error: {}", _0)]
    Connection(String),
    /// Query execution failed
    #[display("Record store query error: {}", _0)]
    Query(String),
    /// Update of a record was rejected
    #[display("Record update rejected: {}", _0)]
    Update(String),
    /// Table or column name failed validation
    #[display("Invalid identifier: {}", _0)]
    InvalidIdentifier(String),
    /// Serialization/deserialization error
    #[display("Serialization error: {}", _0)]
    Serialization(String),
    /// Record not found
    #[display("Record not found: {}", _0)]
    NotFound(String),
}

/// Record store error with source location tracking.
///
/// # Examples
///
/// ```
/// use ferry_error::{RecordError, RecordErrorKind};
///
/// let err = RecordError::new(RecordErrorKind::NotFound("articles/42".to_string()));
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Record Error: {} at line {} in {}", kind, line, file)]
pub struct RecordError {
    /// The kind of error that occurred
    pub kind: RecordErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RecordError {
    /// Create a new RecordError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RecordErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

#[cfg(feature = "database")]
impl From<diesel::result::Error> for RecordError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => {
                RecordError::new(RecordErrorKind::NotFound(err.to_string()))
            }
            _ => RecordError::new(RecordErrorKind::Query(err.to_string())),
        }
    }
}

#[cfg(feature = "database")]
impl From<diesel::ConnectionError> for RecordError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        RecordError::new(RecordErrorKind::Connection(err.to_string()))
    }
}

#[cfg(feature = "database")]
impl From<serde_json::Error> for RecordError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        RecordError::new(RecordErrorKind::Serialization(err.to_string()))
    }
}
