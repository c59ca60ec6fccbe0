//! Error types for the Ferry asset migration engine.
//!
//! This crate provides the foundation error types used throughout the Ferry workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! Transfer errors additionally implement [`RetryableError`], which the retry
//! wrapper in `ferry_rate_limit` consults to separate transient failures
//! (429, 5xx, network) from permanent ones.
//!
//! # Examples
//!
//! ```
//! use ferry_error::{FerryResult, TransferError, TransferErrorKind};
//!
//! fn fetch() -> FerryResult<Vec<u8>> {
//!     Err(TransferError::new(TransferErrorKind::FetchFailed { status: 404 }))?
//! }
//!
//! match fetch() {
//!     Ok(bytes) => println!("Got {} bytes", bytes.len()),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod http;
mod migration;
mod record;
mod retry;
mod storage;
mod transfer;

pub use config::ConfigError;
pub use error::{FerryError, FerryErrorKind, FerryResult};
pub use http::HttpError;
pub use migration::{MigrationError, MigrationErrorKind};
pub use record::{RecordError, RecordErrorKind};
pub use retry::RetryableError;
pub use storage::{StorageError, StorageErrorKind};
pub use transfer::{TransferError, TransferErrorKind};
