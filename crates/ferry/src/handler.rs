//! The invocation handler.
//!
//! One JSON request in, one JSON response out. Every outcome, including
//! failures, is a [`Response`] whose `success` flag tells the caller what
//! happened; nothing escapes as an error.

use crate::Engine;
use ferry_core::{CleanupOutcome, CleanupReport, CollectionStatus, Deadline, PerItemResult};
use ferry_error::{FerryError, FerryResult, MigrationError, MigrationErrorKind};
use ferry_migration::DeletionMode;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// Records per migrate invocation when the request does not say.
pub const DEFAULT_MIGRATE_BATCH: usize = 2;

/// Objects per cleanup invocation when the request does not say.
pub const DEFAULT_CLEANUP_BATCH: usize = 100;

/// What an invocation asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Per-collection counts
    Status,
    /// One migration batch
    Migrate,
    /// Orphan report or deletion
    Cleanup,
}

/// A request to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    /// Requested operation
    pub mode: Mode,
    /// Collection to migrate
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Records (migrate) or objects (cleanup) per call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    /// Paging hint for migrate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    /// Cleanup only; anything but an explicit `false` is a dry run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    /// Cleanup only; orphan paths to include for review
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_limit: Option<usize>,
}

impl Invocation {
    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            collection: None,
            batch_size: None,
            offset: None,
            dry_run: None,
            sample_limit: None,
        }
    }

    /// A status request.
    pub fn status() -> Self {
        Self::with_mode(Mode::Status)
    }

    /// A migrate request for `collection`.
    pub fn migrate(collection: impl Into<String>) -> Self {
        Self {
            collection: Some(collection.into()),
            ..Self::with_mode(Mode::Migrate)
        }
    }

    /// A dry-run cleanup request.
    pub fn cleanup() -> Self {
        Self::with_mode(Mode::Cleanup)
    }

    /// Set the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Set the migrate offset.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Set the cleanup dry-run flag.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = Some(dry_run);
        self
    }

    /// Set the cleanup sample size.
    pub fn with_sample_limit(mut self, sample_limit: usize) -> Self {
        self.sample_limit = Some(sample_limit);
        self
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run != Some(false)
    }
}

/// Body of a status response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
    /// Counts per collection
    pub collections: Vec<CollectionStatus>,
    /// Pending references over all collections
    pub pending_total: u64,
}

/// Body of a migrate response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrateBody {
    /// Collection migrated
    #[serde(rename = "type")]
    pub collection: String,
    /// Records attempted
    pub attempted: usize,
    /// Records migrated, fully or partly
    pub migrated: usize,
    /// Records that failed
    pub errors: usize,
    /// Records still pending
    pub remaining: u64,
    /// Whether the budget cut the batch short
    pub stopped_early: bool,
    /// Per-record outcomes
    pub results: Vec<PerItemResult>,
}

/// Mode-specific part of a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    /// Status counts
    Status(StatusBody),
    /// One migration batch
    Migrate(MigrateBody),
    /// Cleanup dry run
    CleanupReport(CleanupReport),
    /// Cleanup deletion
    Cleanup(CleanupOutcome),
    /// Any failure
    Failure {
        /// Human-readable cause
        error: String,
    },
}

impl ResponseBody {
    /// True when the work stopped on an error after partly completing.
    fn reports_error(&self) -> bool {
        match self {
            ResponseBody::Cleanup(outcome) => outcome.error.is_some(),
            ResponseBody::Failure { .. } => true,
            _ => false,
        }
    }
}

/// What every invocation returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// False when the invocation failed as a whole
    pub success: bool,
    /// Mode-specific fields
    #[serde(flatten)]
    pub body: ResponseBody,
    /// Wall-clock time spent, in milliseconds
    pub elapsed_time: u64,
}

impl Response {
    fn failure(error: &FerryError, started: Instant) -> Self {
        Self {
            success: false,
            body: ResponseBody::Failure {
                error: error.to_string(),
            },
            elapsed_time: elapsed_ms(started),
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Run one invocation.
///
/// `connect` builds the engine. It runs first, so missing credentials or a
/// bad configuration fail the invocation before any store is touched.
#[instrument(skip(connect), fields(mode = ?invocation.mode))]
pub async fn handle<F>(invocation: &Invocation, connect: F) -> Response
where
    F: FnOnce() -> FerryResult<Engine>,
{
    let started = Instant::now();

    let engine = match connect() {
        Ok(engine) => engine,
        Err(e) => {
            error!(error = %e, configuration = e.is_configuration(), "Invocation aborted before start");
            return Response::failure(&e, started);
        }
    };

    match dispatch(&engine, invocation).await {
        Ok(body) => {
            let response = Response {
                success: !body.reports_error(),
                body,
                elapsed_time: elapsed_ms(started),
            };
            info!(elapsed_ms = response.elapsed_time, "Invocation finished");
            response
        }
        Err(e) => {
            warn!(error = %e, "Invocation failed");
            Response::failure(&e, started)
        }
    }
}

/// Parse a JSON request and run it.
pub async fn handle_json<F>(request: &str, connect: F) -> Response
where
    F: FnOnce() -> FerryResult<Engine>,
{
    match serde_json::from_str::<Invocation>(request) {
        Ok(invocation) => handle(&invocation, connect).await,
        Err(e) => {
            let err = FerryError::from(MigrationError::new(MigrationErrorKind::Aborted(format!(
                "Invalid request: {}",
                e
            ))));
            Response::failure(&err, Instant::now())
        }
    }
}

async fn dispatch(engine: &Engine, invocation: &Invocation) -> FerryResult<ResponseBody> {
    let config = engine.config();
    match invocation.mode {
        Mode::Status => {
            let collections = engine.reconciler().status_all().await?;
            let pending_total = collections.iter().map(|s| s.pending).sum();
            Ok(ResponseBody::Status(StatusBody {
                collections,
                pending_total,
            }))
        }
        Mode::Migrate => {
            let collection = invocation.collection.as_deref().ok_or_else(|| {
                MigrationError::new(MigrationErrorKind::Aborted(
                    "migrate requires a type".to_string(),
                ))
            })?;
            let deadline = Deadline::new(config.budget.migrate());
            let batch = engine
                .migrator()
                .migrate_batch(
                    collection,
                    invocation.batch_size.unwrap_or(DEFAULT_MIGRATE_BATCH).max(1),
                    invocation.offset.unwrap_or(0),
                    &deadline,
                )
                .await?;
            Ok(ResponseBody::Migrate(MigrateBody {
                collection: batch.collection,
                attempted: batch.attempted,
                migrated: batch.succeeded,
                errors: batch.failed,
                remaining: batch.remaining,
                stopped_early: batch.stopped_early,
                results: batch.results,
            }))
        }
        Mode::Cleanup if invocation.is_dry_run() => {
            let sample = invocation
                .sample_limit
                .unwrap_or(*config.cleanup.sample_limit());
            Ok(ResponseBody::CleanupReport(
                engine.reclaimer().report(sample).await?,
            ))
        }
        Mode::Cleanup => {
            let deadline = Deadline::new(config.budget.cleanup());
            let pending = engine.reconciler().pending_total().await?;
            if pending > 0 {
                return Err(MigrationError::new(MigrationErrorKind::PendingAssets(pending)).into());
            }
            let outcome = engine
                .reclaimer()
                .delete_orphans(
                    DeletionMode::Execute,
                    invocation.batch_size.unwrap_or(DEFAULT_CLEANUP_BATCH).max(1),
                    &deadline,
                )
                .await?;
            Ok(ResponseBody::Cleanup(outcome))
        }
    }
}
