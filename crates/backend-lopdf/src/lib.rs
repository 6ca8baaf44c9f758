//! Document backend over the lopdf library.
//!
//! This crate implements the `DocumentBackend` trait from platen-traits by
//! writing Image and ImageMask XObject streams into a `lopdf::Document`.

mod backend;

pub use backend::LopdfBackend;
