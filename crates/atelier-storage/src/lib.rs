//! Named JSON document storage for the Atelier storefront.
//!
//! Each piece of client-side state (cart, applied coupon, price filter) is
//! kept as one JSON document under a stable key. Backends decide where the
//! bytes live:
//!
//! - [`MemoryBackend`] for tests and ephemeral sessions
//! - [`FileBackend`] for one-file-per-key durable storage
//!
//! # Example
//!
//! ```rust
//! use atelier_storage::{cache_key, Cache, MemoryBackend};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Filter {
//!     min: i64,
//!     max: i64,
//! }
//!
//! let cache = Cache::new(MemoryBackend::new());
//! let key = cache_key!("atelier", "price-filter");
//!
//! cache.set(&key, &Filter { min: 0, max: 500 }).unwrap();
//! let filter: Option<Filter> = cache.get(&key).unwrap();
//! assert_eq!(filter.map(|f| f.max), Some(500));
//! ```

mod backend;
mod error;
mod kv;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use error::StorageError;
pub use kv::Cache;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, FileBackend, MemoryBackend, StorageBackend, StorageError};
}
