//! Wiring stores and components into one engine.

use ferry_core::FerryConfig;
use ferry_error::FerryResult;
use ferry_interface::{AssetTransfer, RecordStore, SourceStore, TargetStore};
use ferry_migration::{BatchMigrator, OrphanReclaimer, ReferenceLocator, StatusReconciler};
use std::sync::Arc;

/// The migrator, reconciler and reclaimer sharing one set of stores.
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct Engine {
    config: FerryConfig,
    migrator: BatchMigrator,
    reconciler: StatusReconciler,
    reclaimer: OrphanReclaimer,
}

impl Engine {
    /// Assemble an engine over explicit stores.
    pub fn new(
        config: FerryConfig,
        records: Arc<dyn RecordStore>,
        source: Arc<dyn SourceStore>,
        target: Arc<dyn TargetStore>,
        transfer: Arc<dyn AssetTransfer>,
    ) -> FerryResult<Self> {
        config.validate()?;
        let locator = ReferenceLocator::new(source.public_url_prefix())?;

        let migrator = BatchMigrator::new(records.clone(), transfer, locator.clone(), &config);
        let reconciler = StatusReconciler::new(
            records.clone(),
            target,
            locator.clone(),
            config.collections.clone(),
            *config.cleanup.scan_page_size(),
        );
        let reclaimer = OrphanReclaimer::new(
            source,
            records,
            locator,
            config.collections.clone(),
            config.cleanup.clone(),
        );

        Ok(Self {
            config,
            migrator,
            reconciler,
            reclaimer,
        })
    }

    /// Connect to the production stores named by `credentials`.
    ///
    /// No network traffic happens here; the database pool connects lazily.
    #[cfg(feature = "postgres")]
    #[tracing::instrument(skip_all)]
    pub fn connect(config: FerryConfig, credentials: &ferry_core::Credentials) -> FerryResult<Self> {
        use ferry_database::PostgresRecordStore;
        use ferry_storage::{CloudinaryUploader, HttpAssetTransfer, SupabaseStorage};

        let source = Arc::new(SupabaseStorage::from_credentials(
            credentials,
            &config.source,
            &config.http,
        )?);
        let target: Arc<dyn TargetStore> = Arc::new(CloudinaryUploader::from_credentials(
            credentials,
            &config.target,
            &config.http,
        )?);
        let transfer = Arc::new(HttpAssetTransfer::new(target.clone(), &config.http)?);
        let records = Arc::new(PostgresRecordStore::connect(&credentials.database_url, 4)?);

        tracing::info!(
            bucket = %config.source.bucket(),
            collections = config.collections.len(),
            "Engine connected"
        );
        Self::new(config, records, source, target, transfer)
    }
}
