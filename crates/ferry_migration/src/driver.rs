//! Repeating batches until a collection is done.

use crate::BatchMigrator;
use ferry_core::{Clock, Deadline, ItemStatus, PerItemResult, SystemClock};
use ferry_error::FerryResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Totals over a sequence of batch invocations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveSummary {
    /// Collection that was driven
    pub collection: String,
    /// Batch invocations made
    pub invocations: usize,
    /// Records migrated, fully or partly
    pub migrated: usize,
    /// Records that failed
    pub failed: usize,
    /// Records still pending after the last invocation
    pub remaining: u64,
    /// Failed items across all invocations
    pub errors: Vec<PerItemResult>,
}

/// Invoke [`BatchMigrator::migrate_batch`] until nothing remains.
///
/// Stops when `remaining` reaches zero, or when two consecutive invocations
/// migrate nothing (permanently failing assets). Each invocation gets a fresh
/// `budget`. Records that failed stay pending, so the offset advances past
/// them to reach the rest.
pub async fn drive_until_done(
    migrator: &BatchMigrator,
    collection: &str,
    batch_size: usize,
    budget: Duration,
) -> FerryResult<DriveSummary> {
    drive_with_clock(migrator, collection, batch_size, budget, Arc::new(SystemClock::new())).await
}

/// [`drive_until_done`] on an explicit clock.
pub async fn drive_with_clock(
    migrator: &BatchMigrator,
    collection: &str,
    batch_size: usize,
    budget: Duration,
    clock: Arc<dyn Clock>,
) -> FerryResult<DriveSummary> {
    let total = migrator.pending_count(collection).await?;
    let mut summary = DriveSummary {
        collection: collection.to_string(),
        remaining: total,
        ..Default::default()
    };
    let mut offset = 0;
    let mut idle_runs = 0;

    while summary.remaining > 0 {
        let deadline = Deadline::with_clock(clock.clone(), budget);
        let batch = migrator
            .migrate_batch(collection, batch_size.max(1), offset, &deadline)
            .await?;

        summary.invocations += 1;
        summary.migrated += batch.succeeded;
        summary.failed += batch.failed;
        summary.remaining = batch.remaining;
        summary.errors.extend(
            batch
                .results
                .into_iter()
                .filter(|r| r.status == ItemStatus::Error),
        );
        offset += batch.failed;

        info!(
            collection,
            current = total.saturating_sub(summary.remaining),
            total,
            remaining = summary.remaining,
            "Migration progress"
        );

        if batch.succeeded == 0 {
            idle_runs += 1;
            if idle_runs >= 2 {
                info!(collection, remaining = summary.remaining, "No progress in two invocations, giving up");
                break;
            }
        } else {
            idle_runs = 0;
        }
    }

    Ok(summary)
}
