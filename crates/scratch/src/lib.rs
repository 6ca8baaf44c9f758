//! Filesystem scratch storage for the platen resource cache.
//!
//! This crate provides the native implementation of the `ScratchStore`
//! trait from platen-traits.
//!
//! ## Available Stores
//!
//! - [`FilesystemScratchStore`]: private temp directory, removed on drop
//!
//! ## Re-exports
//!
//! For convenience, we also re-export the in-memory store from
//! platen-traits:
//! - [`InMemoryScratchStore`]: pre-populated in-memory storage

mod filesystem;

pub use filesystem::FilesystemScratchStore;

// Re-export the in-memory store from platen-traits for convenience
pub use platen_traits::InMemoryScratchStore;
