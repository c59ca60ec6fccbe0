#![allow(dead_code)]

use async_trait::async_trait;
use ferry_core::{CollectionSchema, CollectionSpec, FerryConfig, ManualClock, RetryPolicy};
use ferry_database::MemoryRecordStore;
use ferry_error::{FerryResult, TransferError, TransferErrorKind};
use ferry_interface::AssetTransfer;
use ferry_migration::{BatchMigrator, ReferenceLocator};
use ferry_storage::MemoryTargetStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SOURCE: &str = "https://proj.supabase.co/storage/v1/object/public/images/";
pub const TARGET: &str = "https://res.cloudinary.com/demo/";

pub fn src(path: &str) -> String {
    format!("{}{}", SOURCE, path)
}

pub fn tgt(path: &str) -> String {
    format!("{}image/upload/{}", TARGET, path)
}

/// Transfer double: URLs containing "broken" fail with a 404, everything
/// else lands under the target prefix. Optionally advances a manual clock.
#[derive(Debug, Default)]
pub struct ScriptedTransfer {
    calls: Mutex<Vec<String>>,
    clock: Option<(ManualClock, Duration)>,
}

impl ScriptedTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticking(clock: ManualClock, step: Duration) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            clock: Some((clock, step)),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl AssetTransfer for ScriptedTransfer {
    async fn transfer(&self, source_url: &str, destination_folder: &str) -> FerryResult<String> {
        self.calls.lock().expect("lock").push(source_url.to_string());
        if let Some((clock, step)) = &self.clock {
            clock.advance(*step);
        }
        if source_url.contains("broken") {
            return Err(TransferError::new(TransferErrorKind::FetchFailed { status: 404 }).into());
        }
        let name = source_url.rsplit('/').next().unwrap_or("asset");
        Ok(tgt(&format!("{}/{}", destination_folder, name)))
    }
}

pub fn collections() -> Vec<CollectionSpec> {
    vec![
        CollectionSpec::new(
            "articles",
            "articles",
            "articles",
            CollectionSchema::FlatField {
                field: "featured_image".to_string(),
            },
        )
        .with_label_column("title"),
        CollectionSpec::new(
            "article_content",
            "articles",
            "articles/content",
            CollectionSchema::EmbeddedText {
                field: "content".to_string(),
            },
        )
        .with_label_column("title"),
        CollectionSpec::new(
            "stories",
            "web_stories",
            "stories",
            CollectionSchema::ArrayField {
                field: "slides".to_string(),
                sub_field: "image".to_string(),
            },
        ),
    ]
}

pub fn config() -> FerryConfig {
    FerryConfig {
        retry: RetryPolicy::none(),
        collections: collections(),
        ..Default::default()
    }
}

pub fn locator() -> ReferenceLocator {
    ReferenceLocator::new(SOURCE).expect("locator")
}

pub fn target_store() -> Arc<MemoryTargetStore> {
    Arc::new(MemoryTargetStore::new(TARGET))
}

pub fn migrator(records: &MemoryRecordStore, transfer: Arc<ScriptedTransfer>) -> BatchMigrator {
    BatchMigrator::new(Arc::new(records.clone()), transfer, locator(), &config())
}
