//! Layered configuration.
//!
//! Sources in order of precedence (later sources override earlier):
//! 1. Bundled defaults (`ferry.toml` shipped with the workspace)
//! 2. `~/.config/ferry/ferry.toml`
//! 3. `./ferry.toml`
//!
//! Credentials are never read from these files; see [`crate::Credentials`].

use crate::CollectionSpec;
use config::{Config, File, FileFormat};
use ferry_error::{ConfigError, FerryError, FerryResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../ferry.toml");

/// Execution budgets per mode, in seconds.
///
/// The hosting platform kills an invocation at roughly fifty seconds; both
/// budgets stay well under that so the last record can finish persisting.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, derive_getters::Getters)]
pub struct BudgetConfig {
    /// Budget of a `migrate` invocation
    #[serde(default = "default_budget_secs")]
    migrate_secs: u64,
    /// Budget of a `cleanup` invocation
    #[serde(default = "default_budget_secs")]
    cleanup_secs: u64,
}

fn default_budget_secs() -> u64 {
    35
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            migrate_secs: default_budget_secs(),
            cleanup_secs: default_budget_secs(),
        }
    }
}

impl BudgetConfig {
    /// Budget of a `migrate` invocation.
    pub fn migrate(&self) -> Duration {
        Duration::from_secs(self.migrate_secs)
    }

    /// Budget of a `cleanup` invocation.
    pub fn cleanup(&self) -> Duration {
        Duration::from_secs(self.cleanup_secs)
    }
}

/// Exponential backoff parameters for transient failures.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RetryPolicy {
    /// First delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Multiplier applied after each attempt
    #[serde(default = "default_factor")]
    pub factor: u64,
    /// Upper bound on any single delay
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_factor() -> u64 {
    2
}

fn default_max_delay_secs() -> u64 {
    4
}

fn default_max_retries() -> usize {
    3
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff_ms: default_initial_backoff_ms(),
            factor: default_factor(),
            max_delay_secs: default_max_delay_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl RetryPolicy {
    /// A policy that attempts exactly once.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

/// HTTP client settings shared by every store client.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, derive_getters::Getters)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
    /// Optional ceiling on requests per minute to each store
    #[serde(default)]
    requests_per_minute: Option<u32>,
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            requests_per_minute: None,
        }
    }
}

impl HttpConfig {
    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Non-secret source store settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, derive_getters::Getters)]
pub struct SourceConfig {
    /// Bucket holding the assets being migrated away from
    bucket: String,
    /// Page size used when listing the bucket
    #[serde(default = "default_list_page_size")]
    list_page_size: usize,
}

fn default_list_page_size() -> usize {
    1000
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            bucket: "images".to_string(),
            list_page_size: default_list_page_size(),
        }
    }
}

/// Non-secret target store settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, derive_getters::Getters)]
pub struct TargetConfig {
    /// Upload API base URL
    #[serde(default = "default_api_base")]
    api_base: String,
    /// Delivery host whose URLs count as migrated
    #[serde(default = "default_delivery_base")]
    delivery_base: String,
    /// Folder prepended to every collection folder
    #[serde(default)]
    folder_root: Option<String>,
}

fn default_api_base() -> String {
    "https://api.cloudinary.com".to_string()
}

fn default_delivery_base() -> String {
    "https://res.cloudinary.com".to_string()
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            delivery_base: default_delivery_base(),
            folder_root: None,
        }
    }
}

impl TargetConfig {
    /// Destination folder for a collection folder.
    pub fn folder_for(&self, collection_folder: &str) -> String {
        match &self.folder_root {
            Some(root) if !root.is_empty() => {
                format!("{}/{}", root.trim_end_matches('/'), collection_folder)
            }
            _ => collection_folder.to_string(),
        }
    }
}

/// Orphan cleanup settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, derive_getters::Getters)]
pub struct CleanupConfig {
    /// Maximum unreferenced paths returned for review
    #[serde(default = "default_sample_limit")]
    sample_limit: usize,
    /// Objects removed per delete call
    #[serde(default = "default_delete_chunk")]
    delete_chunk: usize,
    /// Record page size when sweeping collections for live references
    #[serde(default = "default_scan_page_size")]
    scan_page_size: usize,
}

fn default_sample_limit() -> usize {
    20
}

fn default_delete_chunk() -> usize {
    20
}

fn default_scan_page_size() -> usize {
    500
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            sample_limit: default_sample_limit(),
            delete_chunk: default_delete_chunk(),
            scan_page_size: default_scan_page_size(),
        }
    }
}

/// Top-level Ferry configuration.
///
/// # Example
///
/// ```no_run
/// use ferry_core::FerryConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = FerryConfig::load()?;
/// let articles = config.collection("articles").unwrap();
/// println!("articles migrate into {}", articles.folder());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct FerryConfig {
    /// Execution budgets
    #[serde(default)]
    pub budget: BudgetConfig,
    /// Retry policy for transfers and store calls
    #[serde(default)]
    pub retry: RetryPolicy,
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
    /// Source store settings
    #[serde(default)]
    pub source: SourceConfig,
    /// Target store settings
    #[serde(default)]
    pub target: TargetConfig,
    /// Orphan cleanup settings
    #[serde(default)]
    pub cleanup: CleanupConfig,
    /// Collections that reference source-store assets
    #[serde(default)]
    pub collections: Vec<CollectionSpec>,
}

impl FerryConfig {
    /// Load configuration from a specific file path layered over the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> FerryResult<Self> {
        debug!("Loading configuration from file");

        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()));
        Self::build(builder)
    }

    /// Parse configuration from a TOML string without the bundled defaults.
    pub fn from_toml_str(toml: &str) -> FerryResult<Self> {
        Self::build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    #[instrument]
    pub fn load() -> FerryResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/ferry/ferry.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("ferry").required(false));

        Self::build(builder)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> FerryResult<Self> {
        let config: FerryConfig = builder
            .build()
            .map_err(|e| {
                FerryError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                FerryError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run safely.
    pub fn validate(&self) -> FerryResult<()> {
        if self.cleanup.delete_chunk == 0 {
            return Err(ConfigError::new("cleanup.delete_chunk must be greater than zero").into());
        }
        if self.source.bucket.is_empty() {
            return Err(ConfigError::new("source.bucket must not be empty").into());
        }
        let mut seen = std::collections::HashSet::new();
        for collection in &self.collections {
            if !seen.insert(collection.name().as_str()) {
                return Err(ConfigError::new(format!(
                    "Collection '{}' is defined more than once",
                    collection.name()
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Look up a collection by name.
    pub fn collection(&self, name: &str) -> Option<&CollectionSpec> {
        self.collections.iter().find(|c| c.name() == name)
    }
}
