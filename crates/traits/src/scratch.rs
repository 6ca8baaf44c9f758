//! ScratchStore trait for abstracting temporary resource storage.
//!
//! The cache persists every canonical resource to scratch storage before
//! embedding it, and later reads the persisted copy back to answer content
//! equality against what was actually stored. This trait decouples the
//! cache from the filesystem.

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

/// Error type for scratch storage operations.
#[derive(Error, Debug, Clone)]
pub enum ScratchError {
    #[error("Failed to write scratch file '{name}': {message}")]
    WriteFailed { name: String, message: String },

    #[error("Failed to read back scratch file '{path}': {message}")]
    ReadFailed { path: String, message: String },
}

/// A trait for process-local temporary storage of resource bytes.
///
/// Each store instance owns one private namespace (for filesystem stores, a
/// private directory created at construction and removed on drop). Names
/// passed to [`write`](ScratchStore::write) are flat file names such as
/// `Image3` or `Mask0`; the store decides where they actually live and
/// returns the resulting path, which is the only key ever used for
/// [`read`](ScratchStore::read) and [`delete`](ScratchStore::delete).
///
/// # Implementations
///
/// - `FilesystemScratchStore` (platen-scratch): private temp directory
/// - [`InMemoryScratchStore`]: pre-populated memory, for tests
pub trait ScratchStore: Debug {
    /// Persist `bytes` under `name`, returning the path of the stored copy.
    fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, ScratchError>;

    /// Read back a previously written file in full.
    fn read(&self, path: &Path) -> Result<Vec<u8>, ScratchError>;

    /// Remove a previously written file.
    ///
    /// Deletion failures are not recoverable by the caller; implementations
    /// log and move on.
    fn delete(&self, path: &Path);
}

/// An in-memory scratch store.
///
/// Bytes are held in a map keyed by the pseudo-path handed out by `write`.
/// This is the simplest store and needs no filesystem, which makes it the
/// store of choice for unit tests.
#[derive(Debug, Default)]
pub struct InMemoryScratchStore {
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
}

impl InMemoryScratchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files currently held.
    ///
    /// Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.files.read().map(|f| f.len()).unwrap_or(0)
    }

    /// `true` when no files are held (or the lock is poisoned).
    pub fn is_empty(&self) -> bool {
        self.files.read().map(|f| f.is_empty()).unwrap_or(true)
    }

    /// Check whether a path is currently stored.
    pub fn contains(&self, path: &Path) -> bool {
        self.files
            .read()
            .map(|f| f.contains_key(path))
            .unwrap_or(false)
    }
}

impl ScratchStore for InMemoryScratchStore {
    fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, ScratchError> {
        let path = PathBuf::from(name);
        let mut files = self.files.write().map_err(|_| ScratchError::WriteFailed {
            name: name.to_string(),
            message: "scratch store lock poisoned".to_string(),
        })?;
        files.insert(path.clone(), bytes.to_vec());
        Ok(path)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, ScratchError> {
        let files = self.files.read().map_err(|_| ScratchError::ReadFailed {
            path: path.display().to_string(),
            message: "scratch store lock poisoned".to_string(),
        })?;
        files.get(path).cloned().ok_or_else(|| ScratchError::ReadFailed {
            path: path.display().to_string(),
            message: "no such scratch file".to_string(),
        })
    }

    fn delete(&self, path: &Path) {
        match self.files.write() {
            Ok(mut files) => {
                if files.remove(path).is_none() {
                    log::warn!("delete of unknown scratch file {}", path.display());
                }
            }
            Err(_) => log::warn!("scratch store lock poisoned during delete"),
        }
    }
}
