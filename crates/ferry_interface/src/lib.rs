//! Trait definitions for the Ferry asset migration engine.
//!
//! The migration engine talks to three external systems and never to a
//! concrete client directly:
//!
//! - [`RecordStore`] - the content database, consumed as an opaque record store
//! - [`SourceStore`] - the object storage assets move away from
//! - [`TargetStore`] - the CDN assets move to
//!
//! [`AssetTransfer`] composes a fetch from the source with an upload to the
//! target and is the seam the batch migrator is tested through.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod record;
mod traits;

pub use record::{Record, RecordQuery, RecordQueryBuilder, RecordQueryBuilderError};
pub use traits::{AssetTransfer, RecordStore, SourceStore, TargetStore, UploadRequest};
