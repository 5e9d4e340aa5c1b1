use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::info;

use super::StorageError;

/// Where the key-value map lives between process restarts.
pub trait StorageBackend: Send + Sync {
    fn load(&self) -> Result<BTreeMap<String, String>, StorageError>;
    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError>;
}

/// Keeps nothing across restarts.
#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryBackend;

impl StorageBackend for MemoryBackend {
    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        Ok(BTreeMap::new())
    }

    fn persist(&self, _entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Stores the whole map as one JSON object, rewritten on every mutation.
#[derive(Clone, Debug)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl StorageBackend for FileBackend {
    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "store file not found, starting empty");
                return Ok(BTreeMap::new());
            }
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let write_error = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, content).map_err(write_error)?;
        fs::rename(&staging, &self.path).map_err(write_error)?;
        Ok(())
    }
}
