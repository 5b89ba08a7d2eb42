//! # ttlkv
//!
//! Concurrent in-memory key-value store with per-key time-to-live.
//!
//! ## Architecture
//! - **Store**: `HashMap` (AHash) behind a `parking_lot::RwLock`; readers run in
//!   parallel, writers are exclusive
//! - **Expiry on read**: an expired entry found by `get` is reported missing and
//!   removed in a separate write section
//! - **Reclaimer**: tokio task sweeping all expired entries on a fixed interval
//! - **Protocol**: request/reply types shared by the RPC and HTTP front ends
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use ttlkv::{Reclaimer, Store, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> ttlkv::Result<()> {
//!     let config = StoreConfig::default();
//!     config.validate()?;
//!
//!     let store = Arc::new(Store::new());
//!     let reclaimer = Reclaimer::spawn(Arc::clone(&store), config.reclaim_interval);
//!
//!     store.set("session:42", "alice", 60);
//!     assert_eq!(store.get("session:42").as_deref(), Some("alice"));
//!
//!     reclaimer.shutdown().await
//! }
//! ```

#![warn(missing_docs)]

mod config;
mod entry;
mod error;
pub mod protocol;
mod reclaimer;
mod stats;
mod store;

pub use config::{StoreConfig, DEFAULT_RECLAIM_INTERVAL};
pub use entry::Entry;
pub use error::{Error, Result};
pub use reclaimer::Reclaimer;
pub use stats::StoreStats;
pub use store::Store;
