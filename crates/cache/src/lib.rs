//! Two-pass deduplicating resource cache for document generation.
//!
//! A rendering pipeline that produces its output in two traversals (one to
//! measure, one to emit) runs every resource request through this cache so
//! that content-equal images and masks are persisted and embedded exactly
//! once. The first traversal is the **discovery pass**: each request is
//! compared against the resources stored so far and either aliased to an
//! existing canonical entry or materialized as a new one. The second
//! traversal is the **replay pass**: requests are resolved purely by call
//! index, with zero content comparisons.
//!
//! # The call-order contract
//!
//! **The replay pass must issue exactly the same number and order of
//! requests as the discovery pass.** The cache can detect a count overrun
//! (it panics), but it cannot detect a reordering: a replay pass that swaps
//! two requests silently receives the wrong resources. Upholding the order
//! is the pipeline's obligation, not something the cache can verify.
//!
//! # Typical flow
//!
//! ```ignore
//! let mut cache = ResourceCache::new(FilesystemScratchStore::new()?);
//! // discovery traversal
//! let mask = cache.get_mask(&mut doc, mask_bytes, w, h, 1);
//! let image = cache.get_image(&mut doc, bitmap, Some(mask));
//! cache.next_pass();
//! // replay traversal: identical calls, same handles back
//! let mask = cache.get_mask(&mut doc, mask_bytes, w, h, 1);
//! let image = cache.get_image(&mut doc, bitmap, Some(mask));
//! cache.flush(&mut doc);
//! ```

mod cache;
mod entry;
mod error;
mod image;
mod mask;
mod resource_cache;

pub use cache::{Cache, Pass};
pub use entry::{CacheEntry, CanonicalRecord, Description};
pub use error::CacheError;
pub use image::{ImageDescription, ImageRecord};
pub use mask::{MaskDescription, MaskRecord};
pub use resource_cache::ResourceCache;
