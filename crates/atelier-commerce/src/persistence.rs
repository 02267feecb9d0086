//! Persistence boundary for engine state.
//!
//! Engines never talk to storage directly. Each one is handed a
//! [`Repository`] for its own document and calls `save` after every
//! effective mutation. Durability is best effort: failures are logged and
//! swallowed, and unreadable documents load as `None` so the engine falls
//! back to its initial state.

use std::marker::PhantomData;

use atelier_storage::{Cache, StorageBackend};
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

/// Load/save access to one persisted state document.
pub trait Repository<T> {
    /// Read the stored state. `None` when missing or unreadable.
    fn load(&self) -> Option<T>;

    /// Write the state. Never fails from the caller's point of view.
    fn save(&self, state: &T);

    /// Read the stored state, or `T::default()`.
    fn load_or_default(&self) -> T
    where
        T: Default,
    {
        self.load().unwrap_or_default()
    }
}

/// Repository storing `T` as a JSON document under a fixed key.
pub struct JsonRepository<T, B> {
    cache: Cache<B>,
    key: String,
    _state: PhantomData<fn() -> T>,
}

impl<T, B: StorageBackend> JsonRepository<T, B> {
    pub fn new(backend: B, key: impl Into<String>) -> Self {
        Self {
            cache: Cache::new(backend),
            key: key.into(),
            _state: PhantomData,
        }
    }

    /// Storage key of the document.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<T, B> Repository<T> for JsonRepository<T, B>
where
    T: Serialize + DeserializeOwned,
    B: StorageBackend,
{
    fn load(&self) -> Option<T> {
        match self.cache.get::<T>(&self.key) {
            Ok(state) => state,
            Err(e) => {
                warn!(key = %self.key, error = %e, "discarding unreadable state document");
                None
            }
        }
    }

    fn save(&self, state: &T) {
        if let Err(e) = self.cache.set(&self.key, state) {
            warn!(key = %self.key, error = %e, "failed to persist state document");
        }
    }
}
