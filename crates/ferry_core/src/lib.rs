//! Core data types for the Ferry asset migration engine.
//!
//! This crate provides the data model shared by every other Ferry crate:
//! where an asset reference lives inside a record, what a batch run reports,
//! how a collection is shaped, and the explicit [`Deadline`] that carries the
//! execution budget through each call.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod credentials;
mod deadline;
mod model;
mod schema;

pub use config::{
    BudgetConfig, CleanupConfig, FerryConfig, HttpConfig, RetryPolicy, SourceConfig, TargetConfig,
};
pub use credentials::Credentials;
pub use deadline::{Clock, Deadline, ManualClock, SystemClock};
pub use model::{
    AssetReference, CleanupOutcome, CleanupReport, CollectionStatus, FieldPath, ItemStatus,
    LocationKind, MigrationBatchResult, PerItemResult, StatusUnit, StorageInventoryEntry,
};
pub use schema::{CollectionSchema, CollectionSpec};
