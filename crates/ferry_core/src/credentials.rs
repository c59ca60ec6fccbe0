//! Store credentials read from the process environment.

use ferry_error::{ConfigError, FerryResult};
use std::fmt;

const SUPABASE_URL: &str = "SUPABASE_URL";
const SUPABASE_SERVICE_ROLE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";
const CLOUDINARY_CLOUD_NAME: &str = "CLOUDINARY_CLOUD_NAME";
const CLOUDINARY_API_KEY: &str = "CLOUDINARY_API_KEY";
const CLOUDINARY_API_SECRET: &str = "CLOUDINARY_API_SECRET";
const DATABASE_URL: &str = "DATABASE_URL";

/// Every secret an invocation needs.
///
/// Validated as a whole before any work starts: a missing value is a
/// configuration error, never a per-item failure.
#[derive(Clone)]
pub struct Credentials {
    /// Source store project URL
    pub source_url: String,
    /// Source store service credential
    pub source_service_key: String,
    /// Target store cloud identifier
    pub target_cloud_name: String,
    /// Target store API key
    pub target_api_key: String,
    /// Target store API secret used for signing uploads
    pub target_api_secret: String,
    /// Record store connection string
    pub database_url: String,
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> FerryResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary lookup.
    ///
    /// Every missing or blank name is reported in a single error.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferry_core::Credentials;
    ///
    /// let err = Credentials::from_lookup(|_| None).unwrap_err();
    /// assert!(err.to_string().contains("CLOUDINARY_API_SECRET"));
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> FerryResult<Self> {
        let mut missing = Vec::new();
        let mut read = |name: &'static str| match lookup(name) {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                missing.push(name);
                String::new()
            }
        };

        let credentials = Self {
            source_url: read(SUPABASE_URL),
            source_service_key: read(SUPABASE_SERVICE_ROLE_KEY),
            target_cloud_name: read(CLOUDINARY_CLOUD_NAME),
            target_api_key: read(CLOUDINARY_API_KEY),
            target_api_secret: read(CLOUDINARY_API_SECRET),
            database_url: read(DATABASE_URL),
        };

        if !missing.is_empty() {
            return Err(ConfigError::new(format!(
                "Missing environment variables: {}",
                missing.join(", ")
            ))
            .into());
        }
        Ok(credentials)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("source_url", &self.source_url)
            .field("source_service_key", &"<redacted>")
            .field("target_cloud_name", &self.target_cloud_name)
            .field("target_api_key", &self.target_api_key)
            .field("target_api_secret", &"<redacted>")
            .field("database_url", &"<redacted>")
            .finish()
    }
}
