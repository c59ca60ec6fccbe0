//! Configuration error types.

/// Configuration error with source location.
///
/// Raised for missing credentials and unreadable or invalid configuration.
/// These are fatal for an invocation and are never recorded per item.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// Error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferry_error::ConfigError;
    ///
    /// let err = ConfigError::new("Missing environment variables: CLOUDINARY_API_SECRET");
    /// assert!(err.message.contains("CLOUDINARY_API_SECRET"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
