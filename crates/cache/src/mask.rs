//! Mask resource kind: raw packed bitmask bytes.
//!
//! Masks are embedded straight from memory (the backend takes the bytes,
//! not a file), but a copy is still persisted to scratch storage so that
//! later equality checks run against what was actually stored.

use crate::entry::{CanonicalRecord, Description};
use crate::error::CacheError;
use platen_traits::{DocumentBackend, ResourceId, ScratchStore};
use std::path::{Path, PathBuf};

/// Describes a candidate mask: borrowed packed rows plus dimensions and
/// bit depth.
#[derive(Debug, Clone, Copy)]
pub struct MaskDescription<'a> {
    bytes: &'a [u8],
    width: u32,
    height: u32,
    bits_per_component: u8,
}

impl<'a> MaskDescription<'a> {
    pub fn new(bytes: &'a [u8], width: u32, height: u32, bits_per_component: u8) -> Self {
        Self {
            bytes,
            width,
            height,
            bits_per_component,
        }
    }
}

/// Canonical record for an embedded mask.
#[derive(Debug)]
pub struct MaskRecord {
    handle: ResourceId,
    path: PathBuf,
    width: u32,
    height: u32,
    bits_per_component: u8,
    len: usize,
}

impl MaskRecord {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Description for MaskDescription<'_> {
    type Record = MaskRecord;

    fn matches(&self, record: &MaskRecord, store: &dyn ScratchStore) -> Result<bool, CacheError> {
        if record.width != self.width
            || record.height != self.height
            || record.bits_per_component != self.bits_per_component
            || record.len != self.bytes.len()
        {
            return Ok(false);
        }
        let stored = store
            .read(&record.path)
            .map_err(CacheError::ContentReadback)?;
        Ok(stored == self.bytes)
    }

    fn materialize(
        &self,
        id: u32,
        backend: &mut dyn DocumentBackend,
        store: &dyn ScratchStore,
    ) -> Result<MaskRecord, CacheError> {
        let name = format!("Mask{id}");
        let path = store
            .write(&name, self.bytes)
            .map_err(CacheError::StorageWrite)?;

        let handle = match backend.embed_raw_mask(
            self.bytes,
            self.width,
            self.height,
            self.bits_per_component,
        ) {
            Ok(handle) => handle,
            Err(err) => {
                store.delete(&path);
                return Err(CacheError::BackendEmbed(err));
            }
        };

        Ok(MaskRecord {
            handle,
            path,
            width: self.width,
            height: self.height,
            bits_per_component: self.bits_per_component,
            len: self.bytes.len(),
        })
    }
}

impl CanonicalRecord for MaskRecord {
    fn handle(&self) -> ResourceId {
        self.handle
    }

    fn release(&mut self, backend: &mut dyn DocumentBackend, store: &dyn ScratchStore) {
        backend.release_resource(self.handle);
        store.delete(&self.path);
    }
}
