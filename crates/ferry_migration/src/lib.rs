//! The migration engine.
//!
//! Moves assets out of a source object store into a target CDN and rewrites
//! every reference to them, in bounded, resumable batches.
//!
//! - [`ReferenceLocator`] finds source-store URLs inside a record.
//! - [`rewrite`] replaces one reference in place.
//! - [`BatchMigrator`] drives locate, transfer, rewrite and persist over a
//!   page of records under a [`Deadline`](ferry_core::Deadline).
//! - [`StatusReconciler`] counts migrated and pending references.
//! - [`OrphanReclaimer`] finds and deletes source objects nothing references.
//! - [`drive_until_done`] repeats batches until a collection is finished.
//!
//! Every operation re-reads the record store and re-lists the bucket; nothing
//! is cached between calls.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod driver;
mod locator;
mod migrator;
mod reclaimer;
mod reconciler;
pub mod rewrite;

pub use driver::{DriveSummary, drive_until_done, drive_with_clock};
pub use locator::ReferenceLocator;
pub use migrator::BatchMigrator;
pub use reclaimer::{DeletionMode, OrphanReclaimer};
pub use reconciler::StatusReconciler;
