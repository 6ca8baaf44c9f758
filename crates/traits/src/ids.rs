//! Newtype wrapper for embedded-resource handles.
//!
//! A `ResourceId` is the opaque handle a document backend returns when a
//! resource is embedded. The cache hands these out to the rendering
//! pipeline; only the backend that minted one can interpret it.

use std::fmt;

/// Handle to a resource embedded in the target document.
///
/// Handles are minted by a [`DocumentBackend`](crate::DocumentBackend) and
/// compared only for identity. The reserved sentinel [`ResourceId::INVALID`]
/// is returned by the cache façade when a resource could not be cached;
/// callers must check [`is_valid`](ResourceId::is_valid) before drawing
/// with a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(i32);

impl ResourceId {
    /// Sentinel for "this resource could not be cached/embedded".
    pub const INVALID: ResourceId = ResourceId(-1);

    /// Wraps a raw backend handle. Negative values are reserved.
    pub fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw handle value.
    pub fn raw(&self) -> i32 {
        self.0
    }

    /// `true` unless this is the invalid sentinel.
    pub fn is_valid(&self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            write!(f, "#invalid")
        }
    }
}
