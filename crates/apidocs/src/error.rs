//! CLI error types.

use apidocs_catalog::CatalogError;
use apidocs_config::ConfigError;
use apidocs_sync::SyncError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Sync(#[from] SyncError),
}
