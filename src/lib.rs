//! Mirror server for the extension marketplace gallery.
//!
//! Serves a locally stored catalog through the upstream gallery query
//! contract, so unmodified editors can point their marketplace setting at
//! the mirror.
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use stockroom::catalog::{fs::DirectoryCatalog, SnapshotStore};
//! use stockroom::config::Config;
//!
//! let config = Config::default();
//! let store = Arc::new(SnapshotStore::new(Arc::new(DirectoryCatalog::new(PathBuf::from("./artifacts")))));
//! store.refresh().await?;
//! stockroom::api::run(config, store).await?;
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod query;

pub use catalog::{Catalog, Snapshot, SnapshotStore};
pub use error::{Error, Result};
pub use query::{execute, validate, ExtensionNamePolicy, QueryOptions};
