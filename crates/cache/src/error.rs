use platen_traits::{BackendError, ScratchError};
use thiserror::Error;

/// Error type for cache operations.
///
/// Every variant is fatal for the current document: a resource that failed
/// to persist or embed during discovery leaves a hole the replay pass
/// cannot fill. Protocol violations (a third pass, a replay overrun) are
/// caller programming errors and panic instead of returning here.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Could not write resource to scratch storage: {0}")]
    StorageWrite(#[source] ScratchError),

    #[error("Document backend failed to embed resource: {0}")]
    BackendEmbed(#[from] BackendError),

    #[error("Could not read back persisted resource for comparison: {0}")]
    ContentReadback(#[source] ScratchError),
}
