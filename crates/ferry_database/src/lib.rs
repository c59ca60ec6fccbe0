//! Record store implementations.
//!
//! - [`PostgresRecordStore`] reads and writes the content tables through a
//!   diesel connection pool (feature `postgres`, on by default).
//! - [`MemoryRecordStore`] keeps tables in memory for tests and rehearsals.
//!
//! Table and column names arrive from configuration, so every identifier is
//! checked with [`validate_identifier`] before it is spliced into SQL. Values
//! are always bound.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod identifier;
mod memory;
#[cfg(feature = "postgres")]
mod postgres;

pub use identifier::{like_pattern, validate_identifier};
pub use memory::MemoryRecordStore;
#[cfg(feature = "postgres")]
pub use postgres::{PgPool, PostgresRecordStore};
