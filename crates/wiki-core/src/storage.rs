//! Key-value persistence for documents, history and drafts.
//!
//! Backends implement [`KeyValueStore`] (string keys to string values):
//! - `MemoryStore` - For tests and the in-process mock transport
//! - `FileStore` - A single JSON file on disk, used by the server
//! - `UnavailableStore` - Storage that is not there (every call fails)
//!
//! [`Storage`] wraps a backend with typed JSON access. Read failures degrade
//! to "absent" and write failures are dropped, both with a warning; callers
//! never see storage errors.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Persisted keys.
pub mod keys {
    /// Ordered document collection (most recent first)
    pub const DOCUMENTS: &str = "wiki.documents";
    /// Stamp that scopes the document collection to a session
    pub const DOCUMENTS_STAMP: &str = "wiki.documents.stamp";
    /// Append-only edit history (most recent first)
    pub const HISTORY: &str = "wiki.history";
    /// Content of the document currently open in the editor
    pub const DRAFT_CONTENT: &str = "wiki.draft.content";
    /// Metadata of the document currently open in the editor
    pub const DRAFT_META: &str = "wiki.draft.meta";
    /// Identity recorded on history entries
    pub const EDITOR_ID: &str = "wiki.editor_id";
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage is not available in this context")]
    Unavailable,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt store file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// String key-value backend.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// In-memory backend for testing and the mock transport.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.read().map_err(|_| StorageError::Unavailable)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write().map_err(|_| StorageError::Unavailable)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.write().map_err(|_| StorageError::Unavailable)?;
        values.remove(key);
        Ok(())
    }
}

/// Backend with no storage behind it. Every call fails with
/// [`StorageError::Unavailable`].
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(StorageError::Unavailable)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(StorageError::Unavailable)
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Err(StorageError::Unavailable)
    }
}

/// File-backed store: one pretty-printed JSON object of key to value.
///
/// Every write rewrites the whole file through a temp file + rename so the
/// file is either fully written or untouched.
pub struct FileStore {
    path: PathBuf,
    /// Serializes file access within this process.
    file_lock: Mutex<()>,
}

impl FileStore {
    /// Open (or lazily create) the store file at `path`.
    ///
    /// Creates the parent directory if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            path,
            file_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.file_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Read the map for modification. A corrupt file is moved aside so the
    /// store can keep accepting writes.
    fn read_map_for_write(&self) -> Result<BTreeMap<String, String>> {
        match self.read_map() {
            Err(StorageError::Corrupt { path, reason }) => {
                let backup = path.with_extension("corrupt");
                tracing::warn!(
                    "Store file {:?} is corrupt ({}), moving it to {:?}",
                    path,
                    reason,
                    backup
                );
                fs::rename(&path, &backup)?;
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let contents = serde_json::to_string_pretty(map).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        let temp_path = self.path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));

        if let Err(e) = fs::write(&temp_path, contents) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock();
        Ok(self.read_map()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock();
        let mut map = self.read_map_for_write()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock();
        let mut map = self.read_map_for_write()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

/// Typed, failure-tolerant access to a [`KeyValueStore`].
///
/// Cheap to clone; clones share the backend and the write lock.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueStore>,
    /// Held across read-modify-write cycles (see [`Storage::transaction`]).
    write_lock: Arc<Mutex<()>>,
}

impl Storage {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self::from_backend(Arc::new(backend))
    }

    pub fn from_backend(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Storage over a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Raw string value, `None` when absent or unreadable.
    pub fn load_raw(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    /// Decode a JSON value, `None` when absent, unreadable or malformed.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.load_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring malformed value under {}: {}", key, e);
                None
            }
        }
    }

    /// Write a raw string value. Returns whether it was persisted.
    pub fn persist_raw(&self, key: &str, value: &str) -> bool {
        match self.backend.set(key, value) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to persist {}: {}", key, e);
                false
            }
        }
    }

    /// Encode and write a JSON value. Returns whether it was persisted.
    pub fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(raw) => self.persist_raw(key, &raw),
            Err(e) => {
                tracing::warn!("Failed to encode value for {}: {}", key, e);
                false
            }
        }
    }

    /// Remove a key. Returns whether the removal reached the backend.
    pub fn remove(&self, key: &str) -> bool {
        match self.backend.remove(key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to remove {}: {}", key, e);
                false
            }
        }
    }

    /// Run a read-modify-write cycle while holding the write lock.
    pub fn transaction<R>(&self, f: impl FnOnce(&Storage) -> R) -> R {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        f(self)
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}
