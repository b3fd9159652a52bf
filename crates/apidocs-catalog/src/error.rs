//! Catalog error types.

use std::path::PathBuf;

use apidocs_versions::UnknownVersionError;

/// Error building the catalog. Any error aborts the whole build.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Schema directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Invalid schema file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse schema {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    UnknownVersion(#[from] UnknownVersionError),
}
