use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::debug;

/// Errors raised by draft stores.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("draft store i/o failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode draft: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable key/value storage for raw draft JSON.
pub trait DraftStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, DraftError>;
    fn save(&self, key: &str, raw: &str) -> Result<(), DraftError>;
    fn remove(&self, key: &str) -> Result<(), DraftError>;
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FsDraftStore {
    root: PathBuf,
}

impl FsDraftStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                    ch
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{file}.json"))
    }
}

impl DraftStore for FsDraftStore {
    fn load(&self, key: &str) -> Result<Option<String>, DraftError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(DraftError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn save(&self, key: &str, raw: &str) -> Result<(), DraftError> {
        let io_err = |source| DraftError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.root).map_err(io_err)?;
        let mut staged = tempfile::NamedTempFile::new_in(&self.root).map_err(io_err)?;
        staged.write_all(raw.as_bytes()).map_err(io_err)?;
        staged
            .persist(self.path_for(key))
            .map_err(|err| io_err(err.error))?;
        debug!(key, bytes = raw.len(), "draft written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DraftError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(DraftError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// In-process store, mostly for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

impl DraftStore for MemoryDraftStore {
    fn load(&self, key: &str) -> Result<Option<String>, DraftError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn save(&self, key: &str, raw: &str) -> Result<(), DraftError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), raw.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DraftError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
