//! Store clients and the asset transfer unit.
//!
//! # Components
//!
//! - [`sign_params`] - deterministic upload signatures for the target store
//! - [`HttpAssetTransfer`] - one download, one upload, new canonical URL
//! - [`CloudinaryUploader`] - signed uploads to the target CDN
//! - [`SupabaseStorage`] - bucket listing and deletion on the source store
//! - [`MemorySourceStore`] / [`MemoryTargetStore`] - in-process stores for
//!   tests and offline dry runs
//!
//! # Example
//!
//! ```rust,ignore
//! use ferry_storage::{CloudinaryUploader, HttpAssetTransfer};
//! use ferry_interface::AssetTransfer;
//! use std::sync::Arc;
//!
//! let target = Arc::new(CloudinaryUploader::from_credentials(&credentials, &config)?);
//! let transfer = HttpAssetTransfer::new(target, &config.http)?;
//! let url = transfer.transfer(source_url, "articles").await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod cloudinary;
mod media_type;
mod memory;
mod path;
mod signer;
mod supabase;
mod transfer;

pub use client::build_http_client;
pub use cloudinary::CloudinaryUploader;
pub use media_type::ImageFormat;
pub use memory::{MemorySourceStore, MemoryTargetStore};
pub use path::path_from_public_url;
pub use signer::{SignatureAlgorithm, canonical_string, sign_params};
pub use supabase::SupabaseStorage;
pub use transfer::HttpAssetTransfer;
