//! Raw key-value backends.
//!
//! A backend stores opaque UTF-8 documents under string keys. Typed access
//! with JSON serialization lives in [`Cache`](crate::Cache).

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::StorageError;

/// Durable (or not) storage for named documents.
pub trait StorageBackend {
    /// Read the document stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous document.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the document under `key`. Returns whether it existed.
    fn remove(&self, key: &str) -> Result<bool, StorageError>;

    /// List all stored keys in ascending order.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Rc<B> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        (**self).keys()
    }
}

/// In-memory backend.
///
/// Clones share the same underlying map, so several engines of one session
/// can be handed the same store.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    inner: Rc<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    entries: RefCell<BTreeMap<String, String>>,
    writes: Cell<usize>,
}

impl MemoryBackend {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> usize {
        self.inner.writes.get()
    }

    /// Put a raw document in place without counting it as a write.
    pub fn seed(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner
            .entries
            .borrow_mut()
            .insert(key.into(), value.into());
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.inner.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.inner.writes.set(self.inner.writes.get() + 1);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.inner.entries.borrow_mut().remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.inner.entries.borrow().keys().cloned().collect())
    }
}

/// File-per-key backend rooted at a directory.
///
/// Each document is written to `<dir>/<key>.json`. Writes go through a
/// temporary file and a rename so a crash never leaves half a document.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

const FILE_EXTENSION: &str = "json";

impl FileBackend {
    /// Open (and create if needed) a store in `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .map_err(|e| StorageError::OpenError(format!("{}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    /// Directory backing this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        Ok(self
            .dir
            .join(format!("{}.{}", encode_key(key)?, FILE_EXTENSION)))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        tracing::trace!(key, path = %path.display(), "document written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(decode_key(stem));
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Keys may contain ASCII alphanumerics, `-`, `_`, `.` and `:`.
/// The namespace separator `:` is stored as `%3A` so file names stay portable.
fn encode_key(key: &str) -> Result<String, StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'));
    if !valid {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(key.replace(':', "%3A"))
}

fn decode_key(stem: &str) -> String {
    stem.replace("%3A", ":")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_roundtrip() {
        let store = MemoryBackend::new();
        store.write("atelier:cart", "{}").unwrap();
        assert_eq!(store.read("atelier:cart").unwrap().as_deref(), Some("{}"));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_memory_clones_share_state() {
        let a = MemoryBackend::new();
        let b = a.clone();
        a.write("k", "v").unwrap();
        assert_eq!(b.read("k").unwrap().as_deref(), Some("v"));
        assert_eq!(b.write_count(), 1);
    }

    #[test]
    fn test_memory_seed_is_not_a_write() {
        let store = MemoryBackend::new();
        store.seed("k", "v");
        assert_eq!(store.write_count(), 0);
        assert!(store.remove("k").unwrap());
        assert!(!store.remove("k").unwrap());
    }

    #[test]
    fn test_file_backend_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBackend::open(dir.path()).unwrap();

        assert_eq!(store.read("atelier:cart").unwrap(), None);
        store.write("atelier:cart", r#"{"items":[]}"#).unwrap();
        assert_eq!(
            store.read("atelier:cart").unwrap().as_deref(),
            Some(r#"{"items":[]}"#)
        );
        assert!(dir.path().join("atelier%3Acart.json").exists());
        assert_eq!(store.keys().unwrap(), vec!["atelier:cart".to_string()]);

        assert!(store.remove("atelier:cart").unwrap());
        assert_eq!(store.read("atelier:cart").unwrap(), None);
    }

    #[test]
    fn test_file_backend_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBackend::open(dir.path()).unwrap();
        assert!(matches!(
            store.write("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(store.read(""), Err(StorageError::InvalidKey(_))));
    }
}
