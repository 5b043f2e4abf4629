use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Store capability
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store file `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store file `{}` is not a JSON object: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("stored value for `{key}` is not a string")]
    NotAString { key: String },
    #[error("failed to encode store contents: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A small persistent string map that survives view reloads and restarts.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON file store
// ---------------------------------------------------------------------------

/// Keeps the whole document in memory and replaces the file on every `set`.
/// Values this store does not own may be any JSON type and are written back
/// untouched.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl JsonFileStore {
    pub fn default_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("keyentry").join("storage.json")
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "store file not found, starting empty");
            return Ok(Self {
                path,
                entries: Map::new(),
            });
        }

        let data = std::fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let entries = if data.trim().is_empty() {
            Map::new()
        } else {
            serde_json::from_str(&data).map_err(|source| StoreError::Malformed {
                path: path.clone(),
                source,
            })?
        };
        Ok(Self { path, entries })
    }

    /// Like `open`, but a file that cannot be parsed is renamed to
    /// `<name>.corrupt` and the store starts empty.
    pub fn open_or_recover(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        match Self::open(&path) {
            Err(StoreError::Malformed { source, .. }) => {
                let backup = corrupt_path(&path);
                tracing::warn!(
                    path = %path.display(),
                    backup = %backup.display(),
                    error = %source,
                    "store file is damaged, moving it aside"
                );
                std::fs::rename(&path, &backup).map_err(|source| StoreError::Io {
                    path: backup.clone(),
                    source,
                })?;
                Ok(Self {
                    path,
                    entries: Map::new(),
                })
            }
            other => other,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Writes a sibling temp file and renames it over the old one, so a crash
    // mid-write leaves either the old or the new document on disk.
    fn flush(&self) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|source| io_error(dir, source))?;
        let json = serde_json::to_string_pretty(&self.entries)?;

        let mut file = NamedTempFile::new_in(dir).map_err(|source| io_error(dir, source))?;
        file.write_all(json.as_bytes())
            .map_err(|source| io_error(file.path(), source))?;
        file.as_file()
            .sync_all()
            .map_err(|source| io_error(file.path(), source))?;
        file.persist(&self.path)
            .map_err(|err| io_error(&self.path, err.error))?;
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn corrupt_path(path: &Path) -> PathBuf {
    match path.file_name() {
        Some(name) => {
            let mut name = name.to_os_string();
            name.push(".corrupt");
            path.with_file_name(name)
        }
        None => path.with_extension("corrupt"),
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.entries.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(_) => Err(StoreError::NotAString {
                key: key.to_string(),
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .insert(key.to_string(), Value::String(value.to_string()));
        self.flush()
    }
}
