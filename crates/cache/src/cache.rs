//! The two-pass `find` algorithm over an ordered entry arena.

use crate::entry::{CacheEntry, CanonicalRecord, Description};
use crate::error::CacheError;
use platen_traits::{DocumentBackend, ResourceId, ScratchStore};

/// Which of the two traversals the cache is currently serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// First traversal: build the dedup table.
    Discovery,
    /// Second traversal: resolve by call index only.
    Replay,
}

/// An ordered collection of cache entries plus the two-pass counters.
///
/// One `Cache` serves one resource kind (the façade composes one per kind).
/// During [`Pass::Discovery`] every `find` call appends exactly one entry,
/// canonical or reference, so the entry sequence is a transcript of the
/// call sequence. During [`Pass::Replay`] that transcript is replayed by
/// index.
///
/// See the crate docs for the call-order contract the caller must uphold.
#[derive(Debug)]
pub struct Cache<R> {
    entries: Vec<CacheEntry<R>>,
    pass: Pass,
    next_id: u32,
}

impl<R> Default for Cache<R> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            pass: Pass::Discovery,
            next_id: 0,
        }
    }
}

impl<R: CanonicalRecord> Cache<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pass(&self) -> Pass {
        self.pass
    }

    /// Total entries recorded so far (canonical plus references).
    pub fn count_entries(&self) -> usize {
        self.entries.len()
    }

    /// Canonical entries only; distinct resources actually embedded.
    pub fn count_canonical(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.as_canonical().is_some())
            .count()
    }

    /// Reference entries only; deduplicated requests.
    pub fn count_references(&self) -> usize {
        self.entries.iter().filter(|e| e.is_reference()).count()
    }

    /// Look up or create the resource described by `description`.
    ///
    /// During discovery this scans canonical entries in insertion order,
    /// aliasing on the first content match and materializing otherwise.
    /// During replay it resolves the entry recorded for this call index
    /// without touching the description's content at all.
    ///
    /// # Errors
    ///
    /// A discovery-pass storage or embed failure appends no entry and is
    /// fatal for the document: the replay transcript is now short one
    /// entry, and replay will panic when its call count reaches the gap.
    ///
    /// # Panics
    ///
    /// Panics if the replay pass issues more calls than discovery recorded.
    pub fn find<D: Description<Record = R>>(
        &mut self,
        description: &D,
        backend: &mut dyn DocumentBackend,
        store: &dyn ScratchStore,
    ) -> Result<ResourceId, CacheError> {
        let id = self.next_id;
        self.next_id += 1;

        match self.pass {
            Pass::Replay => {
                let index = id as usize;
                if index >= self.entries.len() {
                    panic!(
                        "two-pass protocol violated: replay call {} exceeds the {} entries recorded during discovery",
                        index + 1,
                        self.entries.len()
                    );
                }
                Ok(self.resolve(index).handle())
            }
            Pass::Discovery => {
                for index in 0..self.entries.len() {
                    let CacheEntry::Canonical(record) = &self.entries[index] else {
                        continue;
                    };
                    if description.matches(record, store)? {
                        let handle = record.handle();
                        log::debug!("cache hit: call {id} aliases canonical entry {index} ({handle})");
                        self.entries.push(CacheEntry::Reference(index));
                        return Ok(handle);
                    }
                }

                let record = description.materialize(id, backend, store)?;
                let handle = record.handle();
                log::debug!("cache miss: call {id} materialized {handle}");
                self.entries.push(CacheEntry::Canonical(record));
                Ok(handle)
            }
        }
    }

    /// Transition from the discovery pass to the replay pass.
    ///
    /// # Panics
    ///
    /// Panics when called during replay; only two passes exist.
    pub fn next_pass(&mut self) {
        match self.pass {
            Pass::Discovery => {
                log::debug!(
                    "entering replay pass: {} entries ({} canonical)",
                    self.entries.len(),
                    self.count_canonical()
                );
                self.pass = Pass::Replay;
                self.next_id = 0;
            }
            Pass::Replay => {
                panic!("two-pass protocol violated: next_pass called after the replay pass began")
            }
        }
    }

    /// Release every canonical record and reset to a fresh discovery pass.
    ///
    /// Each canonical record gives back its embed handle and scratch file
    /// exactly once; references simply drop. The cache is reusable for a
    /// new document afterwards.
    pub fn flush(&mut self, backend: &mut dyn DocumentBackend, store: &dyn ScratchStore) {
        for entry in self.entries.drain(..) {
            if let CacheEntry::Canonical(mut record) = entry {
                record.release(backend, store);
            }
        }
        self.pass = Pass::Discovery;
        self.next_id = 0;
    }

    /// Resolve the entry at `index` to its canonical record (one hop).
    fn resolve(&self, index: usize) -> &R {
        let target = match &self.entries[index] {
            CacheEntry::Canonical(record) => return record,
            CacheEntry::Reference(target) => *target,
        };
        match &self.entries[target] {
            CacheEntry::Canonical(record) => record,
            CacheEntry::Reference(_) => {
                unreachable!("reference targets are always canonical entries")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::MaskDescription;
    use platen_traits::{InMemoryScratchStore, RecordingBackend, ScratchError};
    use std::path::{Path, PathBuf};

    const MASK_A: &[u8] = &[0b1010_0000, 0b0000_0001];
    const MASK_C: &[u8] = &[0b1111_0000, 0b0000_1111];

    fn desc(bytes: &[u8]) -> MaskDescription<'_> {
        MaskDescription::new(bytes, 8, 2, 1)
    }

    /// Store whose every operation panics; proves the replay pass never
    /// touches scratch storage.
    #[derive(Debug)]
    struct UnusedStore;

    impl ScratchStore for UnusedStore {
        fn write(&self, _name: &str, _bytes: &[u8]) -> Result<PathBuf, ScratchError> {
            panic!("replay must not write scratch storage")
        }
        fn read(&self, _path: &Path) -> Result<Vec<u8>, ScratchError> {
            panic!("replay must not read scratch storage")
        }
        fn delete(&self, _path: &Path) {
            panic!("replay must not delete scratch storage")
        }
    }

    /// Store whose writes always fail, for discovery-failure tests.
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

    #[test]
    fn test_discovery_dedups_equal_content() {
        let mut cache = Cache::new();
        let mut backend = RecordingBackend::new();
        let store = InMemoryScratchStore::new();

        let a = cache.find(&desc(MASK_A), &mut backend, &store).unwrap();
        let b = cache.find(&desc(MASK_A), &mut backend, &store).unwrap();
        let c = cache.find(&desc(MASK_C), &mut backend, &store).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(cache.count_entries(), 3);
        assert_eq!(cache.count_canonical(), 2);
        assert_eq!(cache.count_references(), 1);
        assert_eq!(backend.embeds().len(), 2);
    }

    #[test]
    fn test_discovery_appends_one_entry_per_find() {
        let mut cache = Cache::new();
        let mut backend = RecordingBackend::new();
        let store = InMemoryScratchStore::new();

        for (i, bytes) in [MASK_A, MASK_A, MASK_C, MASK_A].iter().enumerate() {
            cache.find(&desc(bytes), &mut backend, &store).unwrap();
            assert_eq!(cache.count_entries(), i + 1);
        }
    }

    #[test]
    fn test_replay_returns_same_handles_without_touching_storage() {
        let mut cache = Cache::new();
        let mut backend = RecordingBackend::new();
        let store = InMemoryScratchStore::new();

        let discovered: Vec<_> = [MASK_A, MASK_A, MASK_C]
            .iter()
            .map(|bytes| cache.find(&desc(bytes), &mut backend, &store).unwrap())
            .collect();

        cache.next_pass();

        let replayed: Vec<_> = [MASK_A, MASK_A, MASK_C]
            .iter()
            .map(|bytes| cache.find(&desc(bytes), &mut backend, &UnusedStore).unwrap())
            .collect();

        assert_eq!(discovered, replayed);
        // Replay embedded nothing new.
        assert_eq!(backend.embeds().len(), 2);
    }

    #[test]
    fn test_references_never_chain() {
        let mut cache = Cache::new();
        let mut backend = RecordingBackend::new();
        let store = InMemoryScratchStore::new();

        for bytes in [MASK_A, MASK_A, MASK_C, MASK_A, MASK_C] {
            cache.find(&desc(bytes), &mut backend, &store).unwrap();
        }

        for entry in &cache.entries {
            if let CacheEntry::Reference(target) = entry {
                assert!(
                    cache.entries[*target].as_canonical().is_some(),
                    "reference targets a non-canonical entry"
                );
            }
        }
    }

    #[test]
    #[should_panic(expected = "next_pass called after the replay pass began")]
    fn test_third_pass_panics() {
        let mut cache = Cache::<crate::mask::MaskRecord>::new();
        cache.next_pass();
        cache.next_pass();
    }

    #[test]
    #[should_panic(expected = "exceeds the 1 entries recorded during discovery")]
    fn test_replay_overrun_panics() {
        let mut cache = Cache::new();
        let mut backend = RecordingBackend::new();
        let store = InMemoryScratchStore::new();

        cache.find(&desc(MASK_A), &mut backend, &store).unwrap();
        cache.next_pass();
        cache.find(&desc(MASK_A), &mut backend, &UnusedStore).unwrap();
        let _ = cache.find(&desc(MASK_A), &mut backend, &UnusedStore);
    }

    #[test]
    fn test_partial_replay_then_resume() {
        let mut cache = Cache::new();
        let mut backend = RecordingBackend::new();
        let store = InMemoryScratchStore::new();

        let first = cache.find(&desc(MASK_A), &mut backend, &store).unwrap();
        let second = cache.find(&desc(MASK_C), &mut backend, &store).unwrap();
        cache.next_pass();

        // Pipeline stops after one replay call, then resumes later; the
        // second call must still resolve the second entry.
        assert_eq!(
            cache.find(&desc(MASK_A), &mut backend, &UnusedStore).unwrap(),
            first
        );
        assert_eq!(
            cache.find(&desc(MASK_C), &mut backend, &UnusedStore).unwrap(),
            second
        );
    }

    #[test]
    fn test_discovery_failure_appends_nothing() {
        let mut cache = Cache::new();
        let mut backend = RecordingBackend::new();

        let result = cache.find(&desc(MASK_A), &mut backend, &FullDiskStore);
        assert!(matches!(result, Err(CacheError::StorageWrite(_))));
        assert_eq!(cache.count_entries(), 0);
        assert!(backend.embeds().is_empty());
    }

    #[test]
    #[should_panic(expected = "two-pass protocol violated")]
    fn test_replay_detects_discovery_shortfall() {
        let mut cache = Cache::new();
        let mut backend = RecordingBackend::new();
        let store = InMemoryScratchStore::new();

        cache.find(&desc(MASK_A), &mut backend, &store).unwrap();
        // Second discovery call fails and records nothing.
        let _ = cache.find(&desc(MASK_C), &mut backend, &FullDiskStore);
        cache.next_pass();

        cache.find(&desc(MASK_A), &mut backend, &UnusedStore).unwrap();
        let _ = cache.find(&desc(MASK_C), &mut backend, &UnusedStore);
    }

    #[test]
    fn test_flush_resets_for_a_new_document() {
        let mut cache = Cache::new();
        let mut backend = RecordingBackend::new();
        let store = InMemoryScratchStore::new();

        cache.find(&desc(MASK_A), &mut backend, &store).unwrap();
        cache.find(&desc(MASK_A), &mut backend, &store).unwrap();
        cache.next_pass();
        cache.find(&desc(MASK_A), &mut backend, &UnusedStore).unwrap();
        cache.find(&desc(MASK_A), &mut backend, &UnusedStore).unwrap();

        cache.flush(&mut backend, &store);
        assert_eq!(cache.count_entries(), 0);
        assert_eq!(cache.pass(), Pass::Discovery);
        assert!(backend.live().is_empty());
        assert!(store.is_empty());

        // A fresh discovery pass works after the flush.
        let handle = cache.find(&desc(MASK_C), &mut backend, &store).unwrap();
        assert!(handle.is_valid());
        assert_eq!(cache.count_canonical(), 1);
    }
}
