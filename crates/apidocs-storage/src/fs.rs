//! Filesystem page store.
//!
//! Provides [`FsPageStore`] for reading and mutating a documentation tree in
//! a local directory.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::page::Page;
use crate::path;
use crate::storage::{PageEntry, PageStore, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem page store rooted at the content directory.
///
/// # Example
///
/// ```ignore
/// use apidocs_storage::{FsPageStore, PageStore};
///
/// let store = FsPageStore::new("content/rest");
/// let pages = store.scan()?;
/// ```
#[derive(Debug, Clone)]
pub struct FsPageStore {
    root: PathBuf,
}

impl FsPageStore {
    /// Create a store over `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Content root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative file path under the root.
    ///
    /// Rejects paths that could escape the root (e.g., `../../etc/passwd`).
    fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        if !path::is_valid(relative) {
            return Err(StorageError::invalid_path(relative).with_backend(BACKEND));
        }
        if relative.is_empty() {
            Ok(self.root.clone())
        } else {
            Ok(self.root.join(relative))
        }
    }

    fn io_error(err: std::io::Error, path: &Path) -> StorageError {
        StorageError::io(err, Some(path.to_path_buf())).with_backend(BACKEND)
    }

    fn read_page(file: &Path) -> Result<Page, StorageError> {
        let content = fs::read_to_string(file).map_err(|e| Self::io_error(e, file))?;
        Page::parse(&content).map_err(|e| StorageError::parse(e, file).with_backend(BACKEND))
    }

    fn write_page(file: &Path, page: &Page) -> Result<(), StorageError> {
        let content = page
            .render()
            .map_err(|e| StorageError::parse(e, file).with_backend(BACKEND))?;
        fs::write(file, content).map_err(|e| Self::io_error(e, file))
    }

    /// Collect page paths below `dir` recursively.
    fn collect_pages(
        dir: &Path,
        base: &str,
        pages: &mut Vec<(String, PathBuf)>,
    ) -> Result<(), StorageError> {
        let entries = fs::read_dir(dir).map_err(|e| Self::io_error(e, dir))?;

        for entry in entries {
            let entry = entry.map_err(|e| Self::io_error(e, dir))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }

            let file_path = entry.path();
            let is_dir = entry
                .file_type()
                .map_err(|e| Self::io_error(e, &file_path))?
                .is_dir();

            if is_dir {
                Self::collect_pages(&file_path, &path::join(base, &name), pages)?;
            } else if let Some(stem) = name.strip_suffix(".md")
                && !path::is_reserved(&name)
            {
                pages.push((path::join(base, stem), file_path));
            }
        }
        Ok(())
    }
}

impl PageStore for FsPageStore {
    fn scan(&self) -> Result<Vec<PageEntry>, StorageError> {
        if !self.root.is_dir() {
            return Err(StorageError::not_found(&self.root).with_backend(BACKEND));
        }

        let mut files = Vec::new();
        Self::collect_pages(&self.root, "", &mut files)?;

        let mut entries = files
            .par_iter()
            .map(|(page_path, file)| {
                Self::read_page(file).map(|page| PageEntry {
                    path: page_path.clone(),
                    frontmatter: page.frontmatter,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        tracing::debug!(root = %self.root.display(), pages = entries.len(), "Scanned page tree");
        Ok(entries)
    }

    fn read(&self, page_path: &str) -> Result<Page, StorageError> {
        let file = self.resolve(&path::page_file(page_path))?;
        Self::read_page(&file)
    }

    fn write(&self, page_path: &str, page: &Page) -> Result<(), StorageError> {
        let file = self.resolve(&path::page_file(page_path))?;
        Self::write_page(&file, page)
    }

    fn delete(&self, page_path: &str) -> Result<(), StorageError> {
        let file = self.resolve(&path::page_file(page_path))?;
        fs::remove_file(&file).map_err(|e| Self::io_error(e, &file))
    }

    fn read_index(&self, dir: &str) -> Result<Option<Page>, StorageError> {
        let file = self.resolve(&path::index_file(dir))?;
        if !file.is_file() {
            return Ok(None);
        }
        Self::read_page(&file).map(Some)
    }

    fn write_index(&self, dir: &str, page: &Page) -> Result<(), StorageError> {
        let file = self.resolve(&path::index_file(dir))?;
        Self::write_page(&file, page)
    }

    fn dir_exists(&self, dir: &str) -> bool {
        self.resolve(dir).is_ok_and(|d| d.is_dir())
    }

    fn create_dir(&self, dir: &str) -> Result<(), StorageError> {
        let target = self.resolve(dir)?;
        fs::create_dir(&target).map_err(|e| Self::io_error(e, &target))
    }

    fn remove_dir(&self, dir: &str) -> Result<(), StorageError> {
        let target = self.resolve(dir)?;
        if dir.is_empty() {
            return Err(StorageError::invalid_path(dir).with_backend(BACKEND));
        }
        if !self.list_dir(dir)?.is_empty() {
            return Err(StorageError::new(StorageErrorKind::Other)
                .with_path(&target)
                .with_backend(BACKEND));
        }

        // Only the index page and hidden entries are left at this point.
        let entries = fs::read_dir(&target).map_err(|e| Self::io_error(e, &target))?;
        for entry in entries {
            let entry = entry.map_err(|e| Self::io_error(e, &target))?;
            let entry_path = entry.path();
            let is_dir = entry
                .file_type()
                .map_err(|e| Self::io_error(e, &entry_path))?
                .is_dir();
            let removed = if is_dir {
                fs::remove_dir_all(&entry_path)
            } else {
                fs::remove_file(&entry_path)
            };
            removed.map_err(|e| Self::io_error(e, &entry_path))?;
        }
        fs::remove_dir(&target).map_err(|e| Self::io_error(e, &target))
    }

    fn list_dir(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let target = self.resolve(dir)?;
        let entries = fs::read_dir(&target).map_err(|e| Self::io_error(e, &target))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Self::io_error(e, &target))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || name == path::INDEX_FILE {
                continue;
            }
            names.push(name);
        }
        names.sort();
        Ok(names)
    }
}
