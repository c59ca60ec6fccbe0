//! Migrated versus pending counts.

use crate::ReferenceLocator;
use ferry_core::{CollectionSchema, CollectionSpec, CollectionStatus, StatusUnit};
use ferry_error::{FerryResult, MigrationError, MigrationErrorKind, RecordError, RecordErrorKind};
use ferry_interface::{Record, RecordQuery, RecordStore, TargetStore};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Aggregates reference counts per collection.
///
/// Flat-field collections are counted in records (one URL each); array and
/// embedded-text collections are counted in assets summed over all records.
/// Read-only.
#[derive(Clone)]
pub struct StatusReconciler {
    records: Arc<dyn RecordStore>,
    target: Arc<dyn TargetStore>,
    locator: ReferenceLocator,
    collections: Vec<CollectionSpec>,
    page_size: usize,
}

impl std::fmt::Debug for StatusReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusReconciler")
            .field("locator", &self.locator)
            .field("collections", &self.collections.len())
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct Tally {
    migrated: u64,
    pending: u64,
    unmanaged: u64,
}

impl StatusReconciler {
    /// Create a reconciler over `collections`, scanning `page_size` rows at a time.
    pub fn new(
        records: Arc<dyn RecordStore>,
        target: Arc<dyn TargetStore>,
        locator: ReferenceLocator,
        collections: Vec<CollectionSpec>,
        page_size: usize,
    ) -> Self {
        Self {
            records,
            target,
            locator,
            collections,
            page_size: page_size.max(1),
        }
    }

    /// Counts for one collection.
    #[instrument(skip(self))]
    pub async fn status(&self, collection: &str) -> FerryResult<CollectionStatus> {
        let spec = self
            .collections
            .iter()
            .find(|c| c.name() == collection)
            .ok_or_else(|| {
                MigrationError::new(MigrationErrorKind::UnknownCollection(collection.to_string()))
            })?;
        self.status_of(spec).await
    }

    /// Counts for every configured collection, in configuration order.
    pub async fn status_all(&self) -> FerryResult<Vec<CollectionStatus>> {
        let mut statuses = Vec::with_capacity(self.collections.len());
        for spec in &self.collections {
            statuses.push(self.status_of(spec).await?);
        }
        Ok(statuses)
    }

    /// Pending references summed over every collection.
    ///
    /// Destructive cleanup is only safe while this is zero.
    pub async fn pending_total(&self) -> FerryResult<u64> {
        Ok(self.status_all().await?.iter().map(|s| s.pending).sum())
    }

    async fn status_of(&self, spec: &CollectionSpec) -> FerryResult<CollectionStatus> {
        let query = RecordQuery::builder()
            .table(spec.table().clone())
            .id_column(spec.id_column().clone())
            .columns(vec![spec.id_column().clone(), spec.schema().field().to_string()])
            .build()
            .map_err(|e| RecordError::new(RecordErrorKind::Query(e.to_string())))?;

        let mut tally = Tally::default();
        let mut offset = 0;
        loop {
            let page = self.records.fetch(&query.page(self.page_size, offset)).await?;
            for record in &page {
                self.tally_record(record, spec, &mut tally);
            }
            if page.len() < self.page_size {
                break;
            }
            offset += page.len();
        }

        let status = CollectionStatus {
            collection: spec.name().clone(),
            unit: if spec.schema().counts_records() {
                StatusUnit::Records
            } else {
                StatusUnit::Assets
            },
            total: tally.migrated + tally.pending + tally.unmanaged,
            migrated: tally.migrated,
            pending: tally.pending,
            unmanaged: tally.unmanaged,
        };
        debug!(
            collection = %status.collection,
            total = status.total,
            migrated = status.migrated,
            pending = status.pending,
            "Collection counted"
        );
        Ok(status)
    }

    fn tally_record(&self, record: &Record, spec: &CollectionSpec, tally: &mut Tally) {
        // Pending is exactly what the migrator would pick up.
        tally.pending += self.locator.locate(record, spec).len() as u64;

        let embedded = matches!(spec.schema(), CollectionSchema::EmbeddedText { .. });
        for (_, url) in self.locator.all_urls(record, spec.schema()) {
            if self.locator.is_source(&url) {
                continue;
            }
            if self.target.owns_url(&url) {
                tally.migrated += 1;
            } else if !embedded {
                // Links in prose are not assets.
                tally.unmanaged += 1;
            }
        }
    }
}
