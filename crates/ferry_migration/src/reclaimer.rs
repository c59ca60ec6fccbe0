//! Orphan detection and deletion on the source store.

use crate::ReferenceLocator;
use ferry_core::{
    CleanupConfig, CleanupOutcome, CleanupReport, CollectionSpec, Deadline, StorageInventoryEntry,
};
use ferry_error::{FerryResult, RecordError, RecordErrorKind};
use ferry_interface::{RecordQuery, RecordStore, SourceStore};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

fn to_mb(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0
}

/// Whether a cleanup call may delete.
///
/// Defaults to [`DeletionMode::DryRun`]; deleting takes an explicit choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeletionMode {
    /// Classify only
    #[default]
    DryRun,
    /// Delete orphans
    Execute,
}

/// Inventory split into referenced objects and orphans.
struct Classification {
    inventory: Vec<StorageInventoryEntry>,
    referenced: HashSet<String>,
    orphans: Vec<StorageInventoryEntry>,
}

/// Finds source-store objects no record references, and deletes them.
///
/// The reference set is rebuilt from every record of every collection on each
/// call, and the bucket is listed fresh. Any failure while building the
/// reference set aborts the call; nothing is deleted on partial knowledge.
///
/// The pending gate (no deletion while migration is incomplete) belongs to
/// the caller; see [`StatusReconciler::pending_total`](crate::StatusReconciler::pending_total).
#[derive(Clone)]
pub struct OrphanReclaimer {
    source: Arc<dyn SourceStore>,
    records: Arc<dyn RecordStore>,
    locator: ReferenceLocator,
    collections: Vec<CollectionSpec>,
    cleanup: CleanupConfig,
}

impl std::fmt::Debug for OrphanReclaimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrphanReclaimer")
            .field("bucket", &self.source.bucket())
            .field("collections", &self.collections.len())
            .field("cleanup", &self.cleanup)
            .finish_non_exhaustive()
    }
}

impl OrphanReclaimer {
    /// Create a reclaimer for the bucket behind `source`.
    pub fn new(
        source: Arc<dyn SourceStore>,
        records: Arc<dyn RecordStore>,
        locator: ReferenceLocator,
        collections: Vec<CollectionSpec>,
        cleanup: CleanupConfig,
    ) -> Self {
        Self {
            source,
            records,
            locator,
            collections,
            cleanup,
        }
    }

    /// Object paths referenced by any record of any collection.
    #[instrument(skip(self))]
    pub async fn referenced_paths(&self) -> FerryResult<HashSet<String>> {
        let page_size = (*self.cleanup.scan_page_size()).max(1);
        let mut referenced = HashSet::new();

        for spec in &self.collections {
            let query = RecordQuery::builder()
                .table(spec.table().clone())
                .id_column(spec.id_column().clone())
                .columns(vec![spec.id_column().clone(), spec.schema().field().to_string()])
                .contains((
                    spec.schema().field().to_string(),
                    self.locator.source_prefix().to_string(),
                ))
                .build()
                .map_err(|e| RecordError::new(RecordErrorKind::Query(e.to_string())))?;

            let mut offset = 0;
            loop {
                let page = self.records.fetch(&query.page(page_size, offset)).await?;
                for record in &page {
                    for reference in self.locator.locate(record, spec) {
                        match self.source.object_path(&reference.source_url) {
                            Some(path) => {
                                referenced.insert(path);
                            }
                            None => warn!(url = %reference.source_url, "Reference maps to no object path"),
                        }
                    }
                }
                if page.len() < page_size {
                    break;
                }
                offset += page.len();
            }
            debug!(collection = %spec.name(), referenced = referenced.len(), "Collection scanned");
        }

        Ok(referenced)
    }

    async fn classify(&self) -> FerryResult<Classification> {
        let referenced = self.referenced_paths().await?;
        let inventory = self.source.list_objects().await?;
        let orphans = inventory
            .iter()
            .filter(|entry| !referenced.contains(&entry.object_path))
            .cloned()
            .collect();
        Ok(Classification {
            inventory,
            referenced,
            orphans,
        })
    }

    /// Objects present in the bucket that no record references.
    pub async fn list_orphans(&self) -> FerryResult<Vec<StorageInventoryEntry>> {
        Ok(self.classify().await?.orphans)
    }

    /// Dry-run summary with up to `sample_limit` orphan paths for review.
    #[instrument(skip(self), fields(bucket = %self.source.bucket()))]
    pub async fn report(&self, sample_limit: usize) -> FerryResult<CleanupReport> {
        let classification = self.classify().await?;
        let total_bytes: u64 = classification.inventory.iter().map(|e| e.size_bytes).sum();
        let orphan_bytes: u64 = classification.orphans.iter().map(|e| e.size_bytes).sum();
        let unreferenced = classification.orphans.len();

        let report = CleanupReport {
            bucket: self.source.bucket().to_string(),
            total_files: classification.inventory.len(),
            total_size_mb: to_mb(total_bytes),
            referenced_files: classification.inventory.len() - unreferenced,
            unreferenced_files: unreferenced,
            unreferenced_size_mb: to_mb(orphan_bytes),
            potential_savings_mb: to_mb(orphan_bytes),
            sample_unreferenced_files: classification
                .orphans
                .iter()
                .take(sample_limit)
                .map(|e| e.object_path.clone())
                .collect(),
        };
        info!(
            total_files = report.total_files,
            unreferenced_files = report.unreferenced_files,
            "Cleanup report ready"
        );
        Ok(report)
    }

    /// Delete up to `batch_size` orphans in sub-batches.
    ///
    /// The deadline is checked before each sub-batch. `remaining_unreferenced`
    /// comes from a fresh listing after the deletions. In
    /// [`DeletionMode::DryRun`] nothing is deleted.
    #[instrument(skip(self, deadline), fields(bucket = %self.source.bucket()))]
    pub async fn delete_orphans(
        &self,
        mode: DeletionMode,
        batch_size: usize,
        deadline: &Deadline,
    ) -> FerryResult<CleanupOutcome> {
        let classification = self.classify().await?;

        if mode == DeletionMode::DryRun {
            info!(orphans = classification.orphans.len(), "Dry run, nothing deleted");
            return Ok(CleanupOutcome {
                deleted_count: 0,
                remaining_unreferenced: classification.orphans.len(),
                stopped_early: false,
                error: None,
            });
        }

        let targets: Vec<String> = classification
            .orphans
            .iter()
            .take(batch_size)
            .map(|e| e.object_path.clone())
            .collect();

        let chunk_size = (*self.cleanup.delete_chunk()).max(1);
        let mut deleted_count = 0;
        let mut stopped_early = false;
        let mut error = None;

        for chunk in targets.chunks(chunk_size) {
            if deadline.is_exhausted() {
                info!(elapsed_ms = deadline.elapsed_ms(), "Budget spent, stopping before next delete");
                stopped_early = true;
                break;
            }
            match self.source.delete_objects(chunk).await {
                Ok(removed) => {
                    deleted_count += removed;
                    info!(requested = chunk.len(), removed, "Deleted orphan sub-batch");
                }
                Err(e) => {
                    warn!(requested = chunk.len(), deleted_count, error = %e, "Orphan sub-batch failed, stopping");
                    stopped_early = true;
                    error = Some(e.to_string());
                    break;
                }
            }
        }

        let remaining_unreferenced = match self.source.list_objects().await {
            Ok(inventory) => inventory
                .iter()
                .filter(|entry| !classification.referenced.contains(&entry.object_path))
                .count(),
            // Deletions already happened, so report them with an estimate
            Err(e) if deleted_count > 0 || error.is_some() => {
                warn!(error = %e, "Re-listing after deletion failed");
                error = Some(match error {
                    Some(first) => format!("{}; re-listing failed: {}", first, e),
                    None => format!("re-listing failed: {}", e),
                });
                classification.orphans.len().saturating_sub(deleted_count)
            }
            Err(e) => return Err(e),
        };

        Ok(CleanupOutcome {
            deleted_count,
            remaining_unreferenced,
            stopped_early,
            error,
        })
    }
}
