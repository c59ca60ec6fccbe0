//! Ferry - move image assets off an object bucket and onto a CDN.
//!
//! Ferry copies every image a content database points at from a source
//! bucket to a target CDN, rewrites the references in place, reports how far
//! along each collection is, and reclaims bucket objects nothing points at
//! any more. All work happens in short, resumable invocations that respect a
//! fixed execution budget.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use ferry::{Credentials, Engine, FerryConfig, Invocation, handle};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = FerryConfig::load().expect("config");
//!     let invocation = Invocation::migrate("articles");
//!     let response = handle(&invocation, || {
//!         let credentials = Credentials::from_env()?;
//!         Engine::connect(config, &credentials)
//!     })
//!     .await;
//!     println!("{}", serde_json::to_string_pretty(&response).unwrap());
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `postgres` (default) - PostgreSQL record store
//!
//! # Architecture
//!
//! - `ferry_error` - Error types
//! - `ferry_core` - Data model, configuration, credentials, deadlines
//! - `ferry_interface` - Store and transfer traits
//! - `ferry_rate_limit` - Retry and request pacing
//! - `ferry_storage` - Source/target store clients, signer, transfer unit
//! - `ferry_database` - Record stores
//! - `ferry_migration` - Locator, migrator, reconciler, reclaimer
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use ferry_core::*;
pub use ferry_database::*;
pub use ferry_error::*;
pub use ferry_interface::*;
pub use ferry_migration::*;
pub use ferry_rate_limit::*;
pub use ferry_storage::*;

mod engine;
mod handler;
mod observability;

pub use engine::Engine;
pub use handler::{
    DEFAULT_CLEANUP_BATCH, DEFAULT_MIGRATE_BATCH, Invocation, MigrateBody, Mode, Response,
    ResponseBody, StatusBody, handle, handle_json,
};
pub use observability::{LoggingConfig, init_logging};
