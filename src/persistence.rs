use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Faults at the storage boundary. These never escape a public tracker
/// operation; they exist so the swallow sites have something typed to log.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store read failed: {0}")]
    Read(#[source] std::io::Error),
    #[error("store write failed: {0}")]
    Write(#[source] std::io::Error),
}

/// Raw payload transport for the mistakes document. `read` returns `None`
/// when nothing was ever stored; parsing is the tracker's business.
pub trait StorageBackend {
    fn read(&self) -> Result<Option<String>, StoreError>;
    fn write(&mut self, payload: &str) -> Result<(), StoreError>;
}

/// One JSON file on disk. Writes go through a temp file in the same
/// directory and an atomic rename, so a crash mid-write can never leave a
/// truncated document behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Read(err)),
        }
    }

    fn write(&mut self, payload: &str) -> Result<(), StoreError> {
        let parent = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(StoreError::Write)?;

        let mut temp = NamedTempFile::new_in(parent).map_err(StoreError::Write)?;
        temp.write_all(payload.as_bytes())
            .map_err(StoreError::Write)?;
        temp.persist(&self.path)
            .map_err(|err| StoreError::Write(err.error))?;
        Ok(())
    }
}

/// In-memory slot, for tests and embedders that manage durability
/// themselves.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    payload: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(payload: &str) -> Self {
        Self {
            payload: Some(payload.to_string()),
        }
    }
}

impl StorageBackend for MemoryStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.payload.clone())
    }

    fn write(&mut self, payload: &str) -> Result<(), StoreError> {
        self.payload = Some(payload.to_string());
        Ok(())
    }
}
