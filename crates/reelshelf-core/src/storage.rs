use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Storage key holding the JSON array of watchlist entries
pub const WATCHLIST_KEY: &str = "watchlist";
/// Storage key holding the JSON object of progress records keyed by id
pub const PROGRESS_KEY: &str = "watchProgress";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("Failed to write {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable string-keyed JSON documents.
///
/// `load` never fails: unreadable or unparsable data is reported as absent.
/// The store never owns domain data, it only mirrors what the containers hold.
pub trait KeyValueStore {
    fn load(&self, key: &str) -> Option<Value>;
    fn save(&self, key: &str, value: &Value) -> Result<(), StorageError>;
    fn clear(&self, key: &str) -> Result<(), StorageError>;
}

/// Load `key` and deserialize it, treating a shape mismatch like missing data
pub fn load_as<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let value = store.load(key)?;
    match serde_json::from_value(value) {
        Ok(data) => Some(data),
        Err(e) => {
            warn!("Stored {} has an unexpected shape, ignoring it: {}", key, e);
            None
        }
    }
}

/// One pretty-printed `<key>.json` document per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Option<Value> {
        let path = match self.path_for(key) {
            Ok(path) => path,
            Err(e) => {
                warn!("{}", e);
                return None;
            }
        };

        if !path.exists() {
            debug!("Storage miss: {} (file does not exist)", key);
            return None;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {} from {}: {}", key, path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(value) => {
                debug!("Storage hit: {}", key);
                Some(value)
            }
            Err(e) => {
                // Left in place so it can be recovered by hand; the next save replaces it
                warn!("Corrupt {} at {}: {}. Treating as empty.", key, path.display(), e);
                None
            }
        }
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            key: key.to_string(),
            source,
        })?;

        let json = serde_json::to_string_pretty(value).map_err(|source| StorageError::Serialize {
            key: key.to_string(),
            source,
        })?;

        // Write-then-rename so a crash mid-write never leaves a truncated document
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)
            .and_then(|_| std::fs::rename(&tmp_path, &path))
            .map_err(|source| {
                warn!("Failed to write {} to {}: {}", key, path.display(), source);
                StorageError::Io {
                    key: key.to_string(),
                    source,
                }
            })?;

        debug!("Storage saved: {}", key);
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if path.exists() {
            std::fs::remove_file(&path).map_err(|source| StorageError::Io {
                key: key.to_string(),
                source,
            })?;
            info!("Cleared {} ({})", key, path.display());
        }
        Ok(())
    }
}

/// In-process store for ephemeral sessions. Clones share the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Option<Value> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
