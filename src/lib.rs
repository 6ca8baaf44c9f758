//! Platen: a two-pass deduplicating resource cache for document generation.
//!
//! A print-style rendering pipeline traverses its page description twice:
//! once to measure (the **discovery pass**) and once to emit (the **replay
//! pass**). Platen sits between that pipeline and the document backend and
//! guarantees that content-equal images and masks are persisted to scratch
//! storage and embedded into the document exactly once, while every
//! request, duplicate or not, receives a stable resource handle.
//!
//! # The call-order contract
//!
//! The replay pass must issue **exactly** the same sequence of
//! `get_image`/`get_mask` calls as the discovery pass. The cache resolves
//! replay requests purely by call index; it detects count overruns (and
//! panics), but a reordered replay silently receives wrong resources.
//! This is the pipeline's obligation and the central design risk of the
//! two-pass scheme. See [`platen_cache`] for details.
//!
//! # Crates
//!
//! - [`platen_traits`]: `DocumentBackend`/`ScratchStore` seams, handles,
//!   the raster scratch container, in-memory test doubles
//! - [`platen_cache`]: the dedup cache core and the `ResourceCache` façade
//! - [`platen_scratch`]: filesystem scratch store (private temp directory)
//! - [`platen_backend_lopdf`]: a backend writing XObjects via `lopdf`

pub use platen_backend_lopdf::LopdfBackend;
pub use platen_cache::{
    Cache, CacheEntry, CacheError, CanonicalRecord, Description, ImageDescription, ImageRecord,
    MaskDescription, MaskRecord, Pass, ResourceCache,
};
pub use platen_scratch::FilesystemScratchStore;
pub use platen_traits::{
    BackendError, DocumentBackend, EmbedEvent, InMemoryScratchStore, PixelFormat, RasterView,
    RecordingBackend, ResourceId, ScratchError, ScratchStore,
};
