//! Sync error type.

use apidocs_storage::StorageError;
use apidocs_versions::UnknownVersionError;

/// Error returned when projection or reconciliation fails.
///
/// Mutations applied before the failure are not rolled back.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    UnknownVersion(#[from] UnknownVersionError),

    #[error("Cannot store catalog entry as page '{path}': reserved or unsafe name")]
    InvalidName { path: String },
}
