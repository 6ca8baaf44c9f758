pub mod backend;
pub mod ids;
pub mod raster;
pub mod scratch;

pub use backend::{BackendError, DocumentBackend, EmbedEvent, RecordingBackend};
pub use ids::ResourceId;
pub use raster::{PixelFormat, RasterError, RasterView, decode_raster, encode_raster};
pub use scratch::{InMemoryScratchStore, ScratchError, ScratchStore};
