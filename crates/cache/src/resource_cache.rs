//! Domain façade over one image cache and one mask cache.

use crate::cache::{Cache, Pass};
use crate::image::{ImageDescription, ImageRecord};
use crate::mask::{MaskDescription, MaskRecord};
use platen_traits::{DocumentBackend, RasterView, ResourceId, ScratchStore};

/// The resource cache a rendering pipeline talks to.
///
/// Composes two independent [`Cache`] instances (images and masks) over one
/// owned scratch store. Errors never cross the pipeline boundary: a failed
/// lookup logs a diagnostic and returns [`ResourceId::INVALID`], which the
/// pipeline should treat as fatal for the whole document (see the crate
/// docs for why a discovery-pass failure cannot be recovered from).
///
/// The two-pass call-order contract applies per kind: the replay pass must
/// repeat the discovery pass's `get_image` calls in order and its
/// `get_mask` calls in order.
#[derive(Debug)]
pub struct ResourceCache<S: ScratchStore> {
    images: Cache<ImageRecord>,
    masks: Cache<MaskRecord>,
    store: S,
}

impl<S: ScratchStore> ResourceCache<S> {
    /// Builds a cache over its private scratch store. The store is owned
    /// and lives exactly as long as the cache.
    pub fn new(store: S) -> Self {
        Self {
            images: Cache::new(),
            masks: Cache::new(),
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The current pass (both inner caches always agree).
    pub fn pass(&self) -> Pass {
        self.images.pass()
    }

    /// Distinct resources actually embedded, across both kinds.
    pub fn count_canonical(&self) -> usize {
        self.images.count_canonical() + self.masks.count_canonical()
    }

    /// Look up or embed an image, optionally stencilled through a
    /// previously obtained mask handle.
    ///
    /// Returns [`ResourceId::INVALID`] if the image could not be cached.
    pub fn get_image(
        &mut self,
        doc: &mut dyn DocumentBackend,
        bitmap: RasterView<'_>,
        mask: Option<ResourceId>,
    ) -> ResourceId {
        let description = ImageDescription::new(bitmap, mask);
        match self.images.find(&description, doc, &self.store) {
            Ok(handle) => handle,
            Err(err) => {
                log::error!("could not cache image, check available disk space: {err}");
                ResourceId::INVALID
            }
        }
    }

    /// Look up or embed a raw bitmask.
    ///
    /// Returns [`ResourceId::INVALID`] if the mask could not be cached.
    pub fn get_mask(
        &mut self,
        doc: &mut dyn DocumentBackend,
        bytes: &[u8],
        width: u32,
        height: u32,
        bits_per_component: u8,
    ) -> ResourceId {
        let description = MaskDescription::new(bytes, width, height, bits_per_component);
        match self.masks.find(&description, doc, &self.store) {
            Ok(handle) => handle,
            Err(err) => {
                log::error!("could not cache mask, check available disk space: {err}");
                ResourceId::INVALID
            }
        }
    }

    /// Transition both caches from discovery to replay.
    ///
    /// # Panics
    ///
    /// Panics on a third call; only two passes exist.
    pub fn next_pass(&mut self) {
        self.images.next_pass();
        self.masks.next_pass();
    }

    /// Release every embedded resource and scratch file and reset both
    /// caches for a new document.
    pub fn flush(&mut self, doc: &mut dyn DocumentBackend) {
        self.images.flush(doc, &self.store);
        self.masks.flush(doc, &self.store);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platen_traits::{InMemoryScratchStore, PixelFormat, RecordingBackend};

    fn gray(pixels: &[u8], width: u32, height: u32) -> RasterView<'_> {
        RasterView::new(pixels, width, height, PixelFormat::Gray8).unwrap()
    }

    #[test]
    fn test_image_and_mask_caches_are_independent() {
        let mut cache = ResourceCache::new(InMemoryScratchStore::new());
        let mut doc = RecordingBackend::new();
        let pixels = [1u8, 2, 3, 4];
        let mask_bytes = [0b1010_0000u8];

        let mask = cache.get_mask(&mut doc, &mask_bytes, 4, 1, 1);
        let image = cache.get_image(&mut doc, gray(&pixels, 2, 2), Some(mask));

        assert!(mask.is_valid());
        assert!(image.is_valid());
        assert_ne!(mask, image);
        assert_eq!(cache.count_canonical(), 2);
    }

    #[test]
    fn test_duplicate_image_returns_first_handle() {
        let mut cache = ResourceCache::new(InMemoryScratchStore::new());
        let mut doc = RecordingBackend::new();
        let pixels = [5u8, 6, 7, 8];

        let first = cache.get_image(&mut doc, gray(&pixels, 2, 2), None);
        let second = cache.get_image(&mut doc, gray(&pixels, 2, 2), None);

        assert_eq!(first, second);
        assert_eq!(doc.embeds().len(), 1);
    }

    #[test]
    fn test_two_pass_document_generation() {
        let mut cache = ResourceCache::new(InMemoryScratchStore::new());
        let mut doc = RecordingBackend::new();
        let logo = [1u8, 2, 3, 4];
        let photo = [9u8, 8, 7, 6];

        // Discovery traversal: logo appears twice.
        let l1 = cache.get_image(&mut doc, gray(&logo, 2, 2), None);
        let p1 = cache.get_image(&mut doc, gray(&photo, 2, 2), None);
        let l2 = cache.get_image(&mut doc, gray(&logo, 2, 2), None);
        assert_eq!(l1, l2);

        cache.next_pass();

        // Replay traversal: identical calls, identical handles.
        assert_eq!(cache.get_image(&mut doc, gray(&logo, 2, 2), None), l1);
        assert_eq!(cache.get_image(&mut doc, gray(&photo, 2, 2), None), p1);
        assert_eq!(cache.get_image(&mut doc, gray(&logo, 2, 2), None), l1);

        // Only two images were ever embedded.
        assert_eq!(doc.embeds().len(), 2);
    }

    #[test]
    fn test_flush_releases_everything_exactly_once() {
        let mut cache = ResourceCache::new(InMemoryScratchStore::new());
        let mut doc = RecordingBackend::new();
        let pixels = [1u8, 2, 3, 4];
        let mask_bytes = [0b1111_0000u8];

        let mask = cache.get_mask(&mut doc, &mask_bytes, 4, 1, 1);
        cache.get_image(&mut doc, gray(&pixels, 2, 2), Some(mask));
        cache.get_image(&mut doc, gray(&pixels, 2, 2), Some(mask));
        cache.get_mask(&mut doc, &mask_bytes, 4, 1, 1);

        cache.flush(&mut doc);

        // Two embeds (one image, one mask), each released exactly once.
        assert_eq!(doc.embeds().len(), 2);
        assert_eq!(doc.released().len(), 2);
        assert!(doc.live().is_empty());
        assert!(cache.store().is_empty());
        assert_eq!(cache.pass(), Pass::Discovery);
    }

    #[test]
    fn test_failure_yields_invalid_handle_not_panic() {
        use platen_traits::{ScratchError, ScratchStore};
        use std::path::{Path, PathBuf};

        #[derive(Debug)]
        struct FullDiskStore;
        impl ScratchStore for FullDiskStore {
            fn write(&self, name: &str, _bytes: &[u8]) -> Result<PathBuf, ScratchError> {
                Err(ScratchError::WriteFailed {
                    name: name.to_string(),
                    message: "no space left on device".to_string(),
                })
            }
            fn read(&self, path: &Path) -> Result<Vec<u8>, ScratchError> {
                Err(ScratchError::ReadFailed {
                    path: path.display().to_string(),
                    message: "no such file".to_string(),
                })
            }
            fn delete(&self, _path: &Path) {}
        }

        let mut cache = ResourceCache::new(FullDiskStore);
        let mut doc = RecordingBackend::new();
        let pixels = [1u8, 2, 3, 4];

        let image = cache.get_image(&mut doc, gray(&pixels, 2, 2), None);
        let mask = cache.get_mask(&mut doc, &[0xF0], 4, 1, 1);
        assert!(!image.is_valid());
        assert!(!mask.is_valid());
        assert!(doc.embeds().is_empty());
    }
}
