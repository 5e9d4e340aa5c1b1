//! String-keyed persistence shared by the session layer and the catalog.
//!
//! Every value is a string; structured records are stored as JSON documents under
//! fixed keys. Writes go to the backend before they become visible and are
//! announced on a broadcast channel so listeners can react to changes made by
//! other requests. Readers never wait on the backend: writers take turns on a
//! separate lock and only hold the entries lock to swap in the new map.

mod backend;

use std::{
    collections::{BTreeMap, BTreeSet},
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError, RwLock},
};

use thiserror::Error;
use tokio::{
    runtime::{Handle, RuntimeFlavor},
    sync::broadcast,
    task,
};
use uuid::Uuid;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};

/// Prefix under which every browser session keeps its keys.
pub const SCOPE_ROOT: &str = "session/";

const CHANGE_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read store file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write store file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store file is not a valid JSON object: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Notification emitted after a key was written or removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageChange {
    pub key: String,
}

#[derive(Clone)]
pub struct Storage {
    inner: Arc<StorageInner>,
}

struct StorageInner {
    entries: RwLock<BTreeMap<String, String>>,
    writer: Mutex<()>,
    backend: Box<dyn StorageBackend>,
    changes: broadcast::Sender<StorageChange>,
}

impl Storage {
    pub fn open(backend: impl StorageBackend + 'static) -> Result<Self, StorageError> {
        let entries = backend.load()?;
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Ok(Self {
            inner: Arc::new(StorageInner {
                entries: RwLock::new(entries),
                writer: Mutex::new(()),
                backend: Box::new(backend),
                changes,
            }),
        })
    }

    pub fn in_memory() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(StorageInner {
                entries: RwLock::new(BTreeMap::new()),
                writer: Mutex::new(()),
                backend: Box::new(MemoryBackend),
                changes,
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let entries = self
            .inner
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<(), StorageError> {
        let value = value.into();
        self.mutate(key, |entries| {
            entries.insert(key.to_string(), value);
        })
    }

    /// Removing an absent key still succeeds but publishes nothing.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.get(key).is_none() {
            return Ok(());
        }
        self.mutate(key, |entries| {
            entries.remove(key);
        })
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let entries = self
            .inner
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.inner.changes.subscribe()
    }

    pub fn scoped(&self, token: Uuid) -> ScopedStorage {
        ScopedStorage {
            storage: self.clone(),
            prefix: format!("{SCOPE_ROOT}{token}/"),
            token,
        }
    }

    /// Tokens of every session scope that currently holds at least one key.
    pub fn scope_tokens(&self) -> Vec<Uuid> {
        self.keys_with_prefix(SCOPE_ROOT)
            .iter()
            .filter_map(|key| scope_token_of(key))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn mutate<F>(&self, key: &str, apply: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        {
            let _writer = self
                .inner
                .writer
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            let mut next = self
                .inner
                .entries
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            apply(&mut next);
            run_blocking(|| self.inner.backend.persist(&next))?;

            *self
                .inner
                .entries
                .write()
                .unwrap_or_else(PoisonError::into_inner) = next;
        }

        // No subscribers is fine.
        let _ = self.inner.changes.send(StorageChange {
            key: key.to_string(),
        });
        Ok(())
    }
}

/// Runs backend I/O without stalling the other tasks on a multi-threaded runtime.
fn run_blocking<T>(work: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            task::block_in_place(work)
        }
        _ => work(),
    }
}

/// Extract the session token from a scoped key such as `session/<uuid>/admin_user`.
pub fn scope_token_of(key: &str) -> Option<Uuid> {
    let rest = key.strip_prefix(SCOPE_ROOT)?;
    let (token, _) = rest.split_once('/')?;
    Uuid::parse_str(token).ok()
}

/// View of [`Storage`] restricted to a single browser session.
#[derive(Clone)]
pub struct ScopedStorage {
    storage: Storage,
    prefix: String,
    token: Uuid,
}

impl ScopedStorage {
    pub fn token(&self) -> Uuid {
        self.token
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.storage.get(&self.qualify(key))
    }

    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<(), StorageError> {
        self.storage.set(&self.qualify(key), value)
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage.remove(&self.qualify(key))
    }

    fn qualify(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}
