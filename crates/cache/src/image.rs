//! Image resource kind: raster pixels persisted as a scratch container.

use crate::entry::{CanonicalRecord, Description};
use crate::error::CacheError;
use platen_traits::raster::{RASTER_HEADER_LEN, encode_raster};
use platen_traits::{DocumentBackend, PixelFormat, RasterView, ResourceId, ScratchStore};
use std::path::{Path, PathBuf};

/// Describes a candidate image: borrowed caller-owned pixels plus the
/// metadata equality needs, computed once at construction.
///
/// The optional mask handle participates in equality: identical pixels
/// stencilled through different masks are distinct resources.
#[derive(Debug, Clone, Copy)]
pub struct ImageDescription<'a> {
    view: RasterView<'a>,
    mask: Option<ResourceId>,
}

impl<'a> ImageDescription<'a> {
    pub fn new(view: RasterView<'a>, mask: Option<ResourceId>) -> Self {
        Self { view, mask }
    }
}

/// Canonical record for an embedded image: owns one scratch file and one
/// embed handle.
#[derive(Debug)]
pub struct ImageRecord {
    handle: ResourceId,
    path: PathBuf,
    width: u32,
    height: u32,
    format: PixelFormat,
    mask: Option<ResourceId>,
    payload_len: usize,
}

impl ImageRecord {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Description for ImageDescription<'_> {
    type Record = ImageRecord;

    fn matches(&self, record: &ImageRecord, store: &dyn ScratchStore) -> Result<bool, CacheError> {
        if record.width != self.view.width()
            || record.height != self.view.height()
            || record.format != self.view.format()
            || record.mask != self.mask
            || record.payload_len != self.view.pixels().len()
        {
            return Ok(false);
        }
        let stored = store
            .read(&record.path)
            .map_err(CacheError::ContentReadback)?;
        let payload = stored.get(RASTER_HEADER_LEN..).unwrap_or(&[]);
        Ok(payload == self.view.pixels())
    }

    fn materialize(
        &self,
        id: u32,
        backend: &mut dyn DocumentBackend,
        store: &dyn ScratchStore,
    ) -> Result<ImageRecord, CacheError> {
        let name = format!("Image{id}");
        let bytes = encode_raster(&self.view);
        let path = store
            .write(&name, &bytes)
            .map_err(CacheError::StorageWrite)?;

        let handle = match backend.embed_image_file(&path, self.mask) {
            Ok(handle) => handle,
            Err(err) => {
                store.delete(&path);
                return Err(CacheError::BackendEmbed(err));
            }
        };

        Ok(ImageRecord {
            handle,
            path,
            width: self.view.width(),
            height: self.view.height(),
            format: self.view.format(),
            mask: self.mask,
            payload_len: self.view.pixels().len(),
        })
    }
}

impl CanonicalRecord for ImageRecord {
    fn handle(&self) -> ResourceId {
        self.handle
    }

    fn release(&mut self, backend: &mut dyn DocumentBackend, store: &dyn ScratchStore) {
        backend.release_resource(self.handle);
        store.delete(&self.path);
    }
}
