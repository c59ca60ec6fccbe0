//! The batch migrator.

use crate::{ReferenceLocator, rewrite};
use ferry_core::{
    AssetReference, CollectionSpec, Deadline, FerryConfig, ItemStatus, MigrationBatchResult,
    PerItemResult, RetryPolicy, TargetConfig,
};
use ferry_error::{FerryResult, MigrationError, MigrationErrorKind, RecordError, RecordErrorKind};
use ferry_interface::{AssetTransfer, Record, RecordQuery, RecordStore};
use ferry_rate_limit::with_retry_until;
use serde_json::Map;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Rows read per round trip while scanning for pending records.
const SCAN_PAGE: usize = 200;

/// Outcome of one record within a batch.
struct RecordOutcome {
    result: PerItemResult,
    /// The budget ran out before every reference was tried
    interrupted: bool,
}

/// Moves a bounded page of records from the source store to the target.
///
/// Records are processed strictly one after another. Before each record, and
/// before each asset within it, the deadline is checked; once it is spent the
/// batch returns what it has. A record is written at most once, right after
/// its own assets are done, and only if at least one asset moved.
#[derive(Clone)]
pub struct BatchMigrator {
    records: Arc<dyn RecordStore>,
    transfer: Arc<dyn AssetTransfer>,
    locator: ReferenceLocator,
    target: TargetConfig,
    retry: RetryPolicy,
    collections: Vec<CollectionSpec>,
}

impl std::fmt::Debug for BatchMigrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchMigrator")
            .field("locator", &self.locator)
            .field("retry", &self.retry)
            .field("collections", &self.collections.len())
            .finish_non_exhaustive()
    }
}

impl BatchMigrator {
    /// Create a migrator for the collections in `config`.
    pub fn new(
        records: Arc<dyn RecordStore>,
        transfer: Arc<dyn AssetTransfer>,
        locator: ReferenceLocator,
        config: &FerryConfig,
    ) -> Self {
        Self {
            records,
            transfer,
            locator,
            target: config.target.clone(),
            retry: config.retry.clone(),
            collections: config.collections.clone(),
        }
    }

    /// Replace the retry policy used around each transfer.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Configured collection by name.
    pub fn collection(&self, name: &str) -> FerryResult<&CollectionSpec> {
        self.collections
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| {
                MigrationError::new(MigrationErrorKind::UnknownCollection(name.to_string())).into()
            })
    }

    /// Rows of `spec` whose text mentions the source store anywhere.
    ///
    /// A superset of the pending records: the prefix may sit where the
    /// locator never looks, such as an unrelated sub-field.
    fn candidate_query(&self, spec: &CollectionSpec) -> FerryResult<RecordQuery> {
        RecordQuery::builder()
            .table(spec.table().clone())
            .id_column(spec.id_column().clone())
            .columns(spec.columns())
            .contains((
                spec.schema().field().to_string(),
                self.locator.source_prefix().to_string(),
            ))
            .build()
            .map_err(|e| RecordError::new(RecordErrorKind::Query(e.to_string())).into())
    }

    /// Number of records of `collection` still holding source references.
    pub async fn pending_count(&self, collection: &str) -> FerryResult<u64> {
        let spec = self.collection(collection)?;
        Ok(self.scan_pending(spec, 0, 0).await?.1)
    }

    /// Pending records at positions `offset..offset + limit`, with the total
    /// number pending.
    ///
    /// A record is pending when the locator finds at least one reference in
    /// it, the same test the status counts use.
    async fn scan_pending(
        &self,
        spec: &CollectionSpec,
        offset: usize,
        limit: usize,
    ) -> FerryResult<(Vec<Record>, u64)> {
        let query = self.candidate_query(spec)?;
        if self.records.count(&query).await? == 0 {
            return Ok((Vec::new(), 0));
        }

        let mut selected = Vec::new();
        let mut pending = 0usize;
        let mut row_offset = 0;
        loop {
            let page = self.records.fetch(&query.page(SCAN_PAGE, row_offset)).await?;
            let fetched = page.len();
            for record in page {
                if self.locator.locate(&record, spec).is_empty() {
                    continue;
                }
                if pending >= offset && selected.len() < limit {
                    selected.push(record);
                }
                pending += 1;
            }
            if fetched < SCAN_PAGE {
                break;
            }
            row_offset += fetched;
        }
        Ok((selected, pending as u64))
    }

    /// Migrate up to `batch_size` pending records, starting at `offset`.
    ///
    /// `remaining` in the result is a fresh count taken after the batch.
    #[instrument(skip(self, deadline), fields(budget_ms = deadline.budget().as_millis() as u64))]
    pub async fn migrate_batch(
        &self,
        collection: &str,
        batch_size: usize,
        offset: usize,
        deadline: &Deadline,
    ) -> FerryResult<MigrationBatchResult> {
        let spec = self.collection(collection)?;
        let (page, _) = self.scan_pending(spec, offset, batch_size).await?;
        debug!(selected = page.len(), "Selected pending records");

        let mut result = MigrationBatchResult {
            collection: collection.to_string(),
            ..Default::default()
        };

        for record in &page {
            if deadline.is_exhausted() {
                info!(elapsed_ms = deadline.elapsed_ms(), "Budget spent, stopping before next record");
                result.stopped_early = true;
                break;
            }

            let Some(outcome) = self.migrate_record(spec, record, deadline).await else {
                result.stopped_early = true;
                break;
            };

            result.attempted += 1;
            match outcome.result.status {
                ItemStatus::Success => result.succeeded += 1,
                ItemStatus::Error => result.failed += 1,
            }
            result.results.push(outcome.result);

            if outcome.interrupted {
                result.stopped_early = true;
                break;
            }
        }

        result.remaining = self.scan_pending(spec, 0, 0).await?.1;
        result.elapsed_ms = deadline.elapsed_ms();

        info!(
            attempted = result.attempted,
            succeeded = result.succeeded,
            failed = result.failed,
            remaining = result.remaining,
            elapsed_ms = result.elapsed_ms,
            stopped_early = result.stopped_early,
            "Batch finished"
        );
        Ok(result)
    }

    /// Process one record. `None` means the budget ran out before any of its
    /// assets was tried, so the record does not count as attempted.
    async fn migrate_record(
        &self,
        spec: &CollectionSpec,
        record: &Record,
        deadline: &Deadline,
    ) -> Option<RecordOutcome> {
        let title = spec
            .label_column()
            .as_deref()
            .and_then(|column| record.get_str(column))
            .map(str::to_string);
        let references = self.locator.locate(record, spec);

        let field = spec.schema().field();
        let mut fields = Map::new();
        if let Some(value) = record.get(field) {
            fields.insert(field.to_string(), value.clone());
        }

        let folder = self.target.folder_for(spec.folder());
        let mut updated = 0usize;
        let mut errors = Vec::new();
        let mut last_url = None;
        let mut interrupted = false;

        for reference in &references {
            if deadline.is_exhausted() {
                interrupted = true;
                break;
            }
            match self.transfer_one(reference, &folder, deadline).await {
                Ok(new_url) => {
                    if rewrite::apply(
                        &mut fields,
                        &reference.path,
                        &reference.source_url,
                        &new_url,
                        self.locator.source_pattern(),
                    ) {
                        updated += 1;
                        last_url = Some(new_url);
                    }
                }
                Err(e) => {
                    warn!(
                        record_id = %record.id,
                        source_url = %reference.source_url,
                        error = %e,
                        "Asset transfer failed"
                    );
                    errors.push(format!("{}: {}", reference.source_url, e));
                }
            }
        }

        let failed = errors.len();
        if updated == 0 {
            if failed == 0 {
                return None;
            }
            return Some(RecordOutcome {
                result: PerItemResult {
                    assets_failed_count: failed,
                    ..PerItemResult::error(&record.id, title, errors.join("; "))
                },
                interrupted,
            });
        }

        if let Err(e) = self
            .records
            .update_fields(spec.table(), spec.id_column(), &record.id, &fields)
            .await
        {
            warn!(record_id = %record.id, error = %e, "Record update rejected");
            return Some(RecordOutcome {
                result: PerItemResult {
                    assets_failed_count: failed,
                    ..PerItemResult::error(&record.id, title, format!("Failed to save record: {}", e))
                },
                interrupted,
            });
        }

        if interrupted {
            errors.push(format!(
                "{} asset(s) left for the next batch",
                references.len().saturating_sub(updated + failed)
            ));
        }
        debug!(record_id = %record.id, updated, failed, "Record migrated");

        Some(RecordOutcome {
            result: PerItemResult {
                record_id: record.id.clone(),
                title,
                status: ItemStatus::Success,
                new_url: last_url,
                error_message: (!errors.is_empty()).then(|| errors.join("; ")),
                assets_updated_count: updated,
                assets_failed_count: failed,
            },
            interrupted,
        })
    }

    async fn transfer_one(
        &self,
        reference: &AssetReference,
        folder: &str,
        deadline: &Deadline,
    ) -> FerryResult<String> {
        with_retry_until(&self.retry, deadline, || {
            self.transfer.transfer(&reference.source_url, folder)
        })
        .await
    }
}
