//! Generic named-option persistence.
//!
//! The settings record is one option among potentially many; backends
//! store a JSON document of `name -> value`.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("option store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("option store document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not replace option store document: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("option store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Computes an option's next value from its current one
pub type OptionUpdate = Box<dyn FnOnce(Option<Value>) -> Result<Value, StoreError> + Send>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OptionStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the value stored under `name`.
    async fn set(&self, name: &str, value: Value) -> Result<(), StoreError>;

    /// Read-modify-write of `name` as one step; no other writer of the same
    /// store runs between the read and the write. Returns the stored value.
    async fn update(&self, name: &str, apply: OptionUpdate) -> Result<Value, StoreError>;
}

/// Process-local store, used by tests and ephemeral hosts
#[derive(Debug, Default)]
pub struct MemoryOptionStore {
    options: RwLock<HashMap<String, Value>>,
}

impl MemoryOptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OptionStore for MemoryOptionStore {
    async fn get(&self, name: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.options.read().await.get(name).cloned())
    }

    async fn set(&self, name: &str, value: Value) -> Result<(), StoreError> {
        self.options.write().await.insert(name.to_string(), value);
        Ok(())
    }

    async fn update(&self, name: &str, apply: OptionUpdate) -> Result<Value, StoreError> {
        let mut options = self.options.write().await;
        let next = apply(options.get(name).cloned())?;
        options.insert(name.to_string(), next.clone());
        Ok(next)
    }
}

/// JSON document on disk.
///
/// Writes hold an advisory lock on a sibling `.lock` file from the read of
/// the current document until its replacement is renamed into place, so
/// writers in other processes serialize and readers never see a partial write.
#[derive(Debug, Clone)]
pub struct FileOptionStore {
    path: PathBuf,
}

impl FileOptionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(path: &Path) -> PathBuf {
        let mut lock = path.as_os_str().to_owned();
        lock.push(".lock");
        PathBuf::from(lock)
    }

    fn read_document(path: &Path) -> Result<Map<String, Value>, StoreError> {
        match fs::read_to_string(path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Map::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn update_option(path: &Path, name: &str, apply: OptionUpdate) -> Result<Value, StoreError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(Self::lock_path(path))?;
        let mut lock = fd_lock::RwLock::new(lock_file);
        let _guard = lock.write()?;

        let mut document = Self::read_document(path)?;
        let next = apply(document.remove(name))?;
        document.insert(name.to_string(), next.clone());

        let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut temp, &document)?;
        temp.write_all(b"\n")?;
        temp.as_file().sync_all()?;
        temp.persist(path)?;

        debug!("Persisted option '{}' to {}", name, path.display());
        Ok(next)
    }
}

#[async_trait]
impl OptionStore for FileOptionStore {
    async fn get(&self, name: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path.clone();
        let name = name.to_string();
        tokio::task::spawn_blocking(move || {
            let mut document = FileOptionStore::read_document(&path)?;
            Ok(document.remove(&name))
        })
        .await?
    }

    async fn set(&self, name: &str, value: Value) -> Result<(), StoreError> {
        let path = self.path.clone();
        let name = name.to_string();
        let replace: OptionUpdate = Box::new(move |_| Ok(value));
        tokio::task::spawn_blocking(move || {
            FileOptionStore::update_option(&path, &name, replace).map(|_| ())
        })
        .await?
    }

    async fn update(&self, name: &str, apply: OptionUpdate) -> Result<Value, StoreError> {
        let path = self.path.clone();
        let name = name.to_string();
        tokio::task::spawn_blocking(move || FileOptionStore::update_option(&path, &name, apply))
            .await?
    }
}
