//! DocumentBackend trait for abstracting the target document library.
//!
//! The cache never writes into the generated document itself; it hands a
//! persisted scratch file (or raw mask bytes) to a backend and keeps the
//! returned handle. This is the seam towards the actual PDF library.

use crate::ids::ResourceId;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for backend embedding operations.
#[derive(Error, Debug, Clone)]
pub enum BackendError {
    #[error("Failed to embed image '{path}': {message}")]
    ImageEmbedFailed { path: String, message: String },

    #[error("Failed to embed {width}x{height} mask: {message}")]
    MaskEmbedFailed {
        width: u32,
        height: u32,
        message: String,
    },
}

/// A trait for document generators that can embed resources.
///
/// Backends mint [`ResourceId`] handles on embed and take them back on
/// release. The cache guarantees each successful embed is released exactly
/// once, either on flush or never (if the owning cache is dropped without a
/// flush; see the cache crate docs).
pub trait DocumentBackend {
    /// Embed an image from a persisted scratch file.
    ///
    /// The file holds the raster container produced by
    /// [`encode_raster`](crate::raster::encode_raster). `mask`, when given,
    /// is the handle of a previously embedded mask the image is stencilled
    /// through.
    fn embed_image_file(
        &mut self,
        path: &Path,
        mask: Option<ResourceId>,
    ) -> Result<ResourceId, BackendError>;

    /// Embed a raw bitmask directly from memory.
    fn embed_raw_mask(
        &mut self,
        bytes: &[u8],
        width: u32,
        height: u32,
        bits_per_component: u8,
    ) -> Result<ResourceId, BackendError>;

    /// Release a previously embedded resource.
    fn release_resource(&mut self, id: ResourceId);
}

/// One embed call observed by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedEvent {
    Image {
        id: ResourceId,
        path: PathBuf,
        mask: Option<ResourceId>,
    },
    Mask {
        id: ResourceId,
        length: usize,
        width: u32,
        height: u32,
        bits_per_component: u8,
    },
}

impl EmbedEvent {
    pub fn id(&self) -> ResourceId {
        match self {
            EmbedEvent::Image { id, .. } | EmbedEvent::Mask { id, .. } => *id,
        }
    }
}

/// A backend that embeds nothing and records every call.
///
/// Handles are minted sequentially from 0. Used to assert the exactly-once
/// embed/release lifecycle in tests without a real document library.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    embeds: Vec<EmbedEvent>,
    released: Vec<ResourceId>,
    next: i32,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every embed call in order.
    pub fn embeds(&self) -> &[EmbedEvent] {
        &self.embeds
    }

    /// Every release call in order.
    pub fn released(&self) -> &[ResourceId] {
        &self.released
    }

    /// Handles embedded and not yet released.
    pub fn live(&self) -> Vec<ResourceId> {
        self.embeds
            .iter()
            .map(EmbedEvent::id)
            .filter(|id| !self.released.contains(id))
            .collect()
    }

    fn mint(&mut self) -> ResourceId {
        let id = ResourceId::new(self.next);
        self.next += 1;
        id
    }
}

impl DocumentBackend for RecordingBackend {
    fn embed_image_file(
        &mut self,
        path: &Path,
        mask: Option<ResourceId>,
    ) -> Result<ResourceId, BackendError> {
        let id = self.mint();
        self.embeds.push(EmbedEvent::Image {
            id,
            path: path.to_path_buf(),
            mask,
        });
        Ok(id)
    }

    fn embed_raw_mask(
        &mut self,
        bytes: &[u8],
        width: u32,
        height: u32,
        bits_per_component: u8,
    ) -> Result<ResourceId, BackendError> {
        let id = self.mint();
        self.embeds.push(EmbedEvent::Mask {
            id,
            length: bytes.len(),
            width,
            height,
            bits_per_component,
        });
        Ok(id)
    }

    fn release_resource(&mut self, id: ResourceId) {
        self.released.push(id);
    }
}
