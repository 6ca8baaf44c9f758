//! Filesystem-backed scratch store with a private per-instance directory.
//!
//! Each store owns one freshly created directory under the system temp dir
//! (or a caller-supplied parent). The randomized directory name keeps
//! concurrent document-generation processes from colliding; the directory
//! and anything left in it are removed when the store is dropped.

use platen_traits::{ScratchError, ScratchStore};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch store that persists resource bytes as files in a private
/// directory.
///
/// The directory is created at construction and removed on drop, so scratch
/// files never outlive the cache lineage that owns the store. Individual
/// `delete` failures are logged and otherwise ignored; the drop cleanup
/// sweeps up whatever remains.
#[derive(Debug)]
pub struct FilesystemScratchStore {
    dir: TempDir,
}

impl FilesystemScratchStore {
    /// Creates a store with a private directory under the system temp dir.
    pub fn new() -> Result<Self, ScratchError> {
        Self::build(tempfile::Builder::new().prefix("platen-scratch-").tempdir())
    }

    /// Creates a store with a private directory under `parent`.
    pub fn in_dir<P: AsRef<Path>>(parent: P) -> Result<Self, ScratchError> {
        Self::build(
            tempfile::Builder::new()
                .prefix("platen-scratch-")
                .tempdir_in(parent),
        )
    }

    fn build(dir: std::io::Result<TempDir>) -> Result<Self, ScratchError> {
        let dir = dir.map_err(|e| ScratchError::WriteFailed {
            name: "<scratch directory>".to_string(),
            message: e.to_string(),
        })?;
        log::debug!("scratch directory {}", dir.path().display());
        Ok(Self { dir })
    }

    /// The private directory scratch files live in.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

impl ScratchStore for FilesystemScratchStore {
    fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, ScratchError> {
        let path = self.dir.path().join(name);
        std::fs::write(&path, bytes).map_err(|e| ScratchError::WriteFailed {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        Ok(path)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, ScratchError> {
        std::fs::read(path).map_err(|e| ScratchError::ReadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn delete(&self, path: &Path) {
        if let Err(e) = std::fs::remove_file(path) {
            log::warn!("could not delete scratch file {}: {e}", path.display());
        }
    }
}
