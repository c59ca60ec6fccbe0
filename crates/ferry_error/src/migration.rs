//! Migration orchestration error types.

/// Conditions that stop a migration or cleanup invocation as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum MigrationErrorKind {
    /// The requested collection is not configured
    #[display("Unknown collection type: {}", _0)]
    UnknownCollection(String),
    /// Destructive cleanup requested while source references remain
    #[display("Cleanup refused: {} source-store references still pending", _0)]
    PendingAssets(u64),
    /// Destructive cleanup requested without the explicit confirmation flag
    #[display("Deletion requires explicit confirmation")]
    DeletionNotConfirmed,
    /// Invocation stopped before any work could be attempted
    #[display("Invocation aborted: {}", _0)]
    Aborted(String),
}

/// Migration error with location tracking.
///
/// # Examples
///
/// ```
/// use ferry_error::{MigrationError, MigrationErrorKind};
///
/// let err = MigrationError::new(MigrationErrorKind::PendingAssets(4));
/// assert!(format!("{}", err).contains("4 source-store references"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Migration Error: {} at line {} in {}", kind, line, file)]
pub struct MigrationError {
    /// The kind of error that occurred
    pub kind: MigrationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl MigrationError {
    /// Create a new MigrationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: MigrationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
