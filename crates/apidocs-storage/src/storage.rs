//! Page store trait and error types.
//!
//! Provides the core [`PageStore`] trait for abstracting page tree reads and
//! mutations, along with [`StorageError`] for unified error handling across
//! backends.
//!
//! # Path Convention
//!
//! All path parameters are **page paths**, not file paths:
//! - `"meta"` - page `meta.md`
//! - `"actions/artifacts"` - page `actions/artifacts.md`
//! - `""` - root directory (for directory methods)
//!
//! Implementations handle the mapping from page paths to their internal
//! storage format.

use std::path::PathBuf;

use crate::page::{Frontmatter, FrontmatterError, Page};

/// Page discovered by [`PageStore::scan`].
#[derive(Debug, Clone, PartialEq)]
pub struct PageEntry {
    /// Page path (e.g., "meta", "actions/artifacts").
    pub path: String,
    /// Parsed frontmatter.
    pub frontmatter: Frontmatter,
}

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Resource already exists (for create operations).
    AlreadyExists,
    /// Invalid path or identifier.
    InvalidPath,
    /// Page frontmatter could not be parsed or rendered.
    Parse,
    /// Other/unknown error category.
    Other,
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    /// Semantic error category.
    pub kind: StorageErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Create an invalid path error.
    #[must_use]
    pub fn invalid_path(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::InvalidPath).with_path(path)
    }

    /// Create a parse error from a frontmatter error.
    #[must_use]
    pub fn parse(err: FrontmatterError, path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::Parse)
            .with_source(err)
            .with_path(path)
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            std::io::ErrorKind::AlreadyExists => StorageErrorKind::AlreadyExists,
            _ => StorageErrorKind::Other,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: actions/cache.md)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::PermissionDenied => "Permission denied",
            StorageErrorKind::AlreadyExists => "Already exists",
            StorageErrorKind::InvalidPath => "Invalid path",
            StorageErrorKind::Parse => "Parse error",
            StorageErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Storage abstraction over a documentation page tree.
///
/// Every directory may hold one index page and any number of pages and
/// subdirectories. Mutations are applied immediately and in call order;
/// callers rely on that to observe the state left by earlier steps.
///
/// # Page Paths
///
/// All path parameters are **page paths**, not file paths:
/// - `"meta"` - top-level page
/// - `"actions/artifacts"` - nested page
/// - `""` - root directory
pub trait PageStore: Send + Sync {
    /// Scan and return every page with its frontmatter.
    ///
    /// Index pages, readme files and hidden entries are not included.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the tree cannot be listed or a page's
    /// frontmatter fails to parse.
    fn scan(&self) -> Result<Vec<PageEntry>, StorageError>;

    /// Read a page.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the page doesn't exist or can't be parsed.
    fn read(&self, path: &str) -> Result<Page, StorageError>;

    /// Create or replace a page. The parent directory must exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the page can't be written.
    fn write(&self, path: &str, page: &Page) -> Result<(), StorageError>;

    /// Delete a page.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the page doesn't exist or can't be removed.
    fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// Read the index page of a directory.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(page))` - the index page exists and was parsed
    /// - `Ok(None)` - the directory has no index page
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] on I/O error or frontmatter parse error.
    fn read_index(&self, dir: &str) -> Result<Option<Page>, StorageError>;

    /// Create or replace the index page of a directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the index can't be written.
    fn write_index(&self, dir: &str, page: &Page) -> Result<(), StorageError>;

    /// Check if a directory exists.
    fn dir_exists(&self, dir: &str) -> bool;

    /// Create a directory. Its parent must exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the directory can't be created.
    fn create_dir(&self, dir: &str) -> Result<(), StorageError>;

    /// Remove a directory together with its index page and hidden entries.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the directory is the root, doesn't exist,
    /// still holds entries [`list_dir`](Self::list_dir) reports, or can't be
    /// removed.
    fn remove_dir(&self, dir: &str) -> Result<(), StorageError>;

    /// List entry names of a directory, sorted.
    ///
    /// Pages are listed by file name (`cache.md`), subdirectories by name.
    /// The index page and hidden entries are excluded.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the directory doesn't exist or can't be read.
    fn list_dir(&self, dir: &str) -> Result<Vec<String>, StorageError>;
}
