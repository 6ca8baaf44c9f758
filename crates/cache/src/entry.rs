//! Cache entries and the traits a resource kind implements.
//!
//! An entry is either *canonical* (it owns the persisted resource) or a
//! *reference* (it aliases a canonical entry by arena index). References
//! never point at other references, so resolution is always one hop.

use crate::error::CacheError;
use platen_traits::{DocumentBackend, ResourceId, ScratchStore};

/// A transient, stack-lived value describing a candidate resource.
///
/// Descriptions borrow caller-owned bytes and live for the duration of one
/// `find` call; nothing long-lived hangs off them. A resource kind supplies
/// one Description type and one [`CanonicalRecord`] type.
pub trait Description {
    type Record: CanonicalRecord;

    /// Content-equality test against a stored canonical record.
    ///
    /// Equality is decided against the **persisted** copy (read back
    /// through the store), not any in-memory duplicate, so storage
    /// corruption shows up as a miss or a readback error rather than a
    /// false hit.
    fn matches(
        &self,
        record: &Self::Record,
        store: &dyn ScratchStore,
    ) -> Result<bool, CacheError>;

    /// Persist this resource under the never-before-used integer `id` and
    /// embed it through the backend, producing the canonical record.
    ///
    /// On failure, implementations clean up any partially written scratch
    /// file before returning the error.
    fn materialize(
        &self,
        id: u32,
        backend: &mut dyn DocumentBackend,
        store: &dyn ScratchStore,
    ) -> Result<Self::Record, CacheError>;
}

/// The owning record behind a canonical cache entry.
///
/// Exactly one scratch file and one embed handle belong to each record;
/// [`release`](CanonicalRecord::release) gives both back, and the cache
/// guarantees it runs exactly once per record.
pub trait CanonicalRecord {
    /// The embed handle this record owns.
    fn handle(&self) -> ResourceId;

    /// Release the embed handle and delete the scratch file.
    fn release(&mut self, backend: &mut dyn DocumentBackend, store: &dyn ScratchStore);
}

/// One slot in a cache's entry sequence.
#[derive(Debug)]
pub enum CacheEntry<R> {
    /// Owns a persisted resource.
    Canonical(R),
    /// Aliases the canonical entry at the given index. The target is fixed
    /// at creation and is never itself a reference.
    Reference(usize),
}

impl<R> CacheEntry<R> {
    pub fn as_canonical(&self) -> Option<&R> {
        match self {
            CacheEntry::Canonical(record) => Some(record),
            CacheEntry::Reference(_) => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, CacheEntry::Reference(_))
    }
}
