//! Mock page store for testing.
//!
//! Provides [`MockPageStore`] for unit testing without filesystem access.
//! Every successful mutation is appended to a log so tests can assert on
//! both the resulting tree and the order in which it was produced.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use crate::page::Page;
use crate::path;
use crate::storage::{PageEntry, PageStore, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// A mutation applied to a [`MockPageStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateDir(String),
    RemoveDir(String),
    WritePage(String),
    DeletePage(String),
    WriteIndex(String),
}

/// In-memory page store.
///
/// Pages are keyed by page path, index pages by directory. The root
/// directory (`""`) always exists.
///
/// # Example
///
/// ```ignore
/// use apidocs_storage::{MockPageStore, Page, PageStore};
///
/// let store = MockPageStore::new()
///     .with_page("actions/cache", Page::default())
///     .with_index("actions", Page::default());
///
/// assert!(store.page("actions/cache").is_some());
/// ```
#[derive(Debug)]
pub struct MockPageStore {
    pages: RwLock<BTreeMap<String, Page>>,
    indexes: RwLock<BTreeMap<String, Page>>,
    dirs: RwLock<BTreeSet<String>>,
    mutations: RwLock<Vec<Mutation>>,
}

impl Default for MockPageStore {
    fn default() -> Self {
        Self {
            pages: RwLock::new(BTreeMap::new()),
            indexes: RwLock::new(BTreeMap::new()),
            dirs: RwLock::new(BTreeSet::from([String::new()])),
            mutations: RwLock::new(Vec::new()),
        }
    }
}

impl MockPageStore {
    /// Create a new store holding only the root directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory and its ancestors.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_dir(self, dir: &str) -> Self {
        self.insert_dir_all(dir);
        self
    }

    /// Add a page, creating its parent directories.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, page_path: &str, page: Page) -> Self {
        self.insert_dir_all(path::parent(page_path));
        self.pages
            .write()
            .unwrap()
            .insert(page_path.to_owned(), page);
        self
    }

    /// Add an index page, creating the directory.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_index(self, dir: &str, page: Page) -> Self {
        self.insert_dir_all(dir);
        self.indexes.write().unwrap().insert(dir.to_owned(), page);
        self
    }

    /// Page at `page_path`, if present.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn page(&self, page_path: &str) -> Option<Page> {
        self.pages.read().unwrap().get(page_path).cloned()
    }

    /// Index page of `dir`, if present.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn index(&self, dir: &str) -> Option<Page> {
        self.indexes.read().unwrap().get(dir).cloned()
    }

    /// All page paths, sorted.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn page_paths(&self) -> Vec<String> {
        self.pages.read().unwrap().keys().cloned().collect()
    }

    /// All directories except the root, sorted.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn dirs(&self) -> Vec<String> {
        self.dirs
            .read()
            .unwrap()
            .iter()
            .filter(|d| !d.is_empty())
            .cloned()
            .collect()
    }

    /// Mutations applied since creation or the last [`clear_mutations`](Self::clear_mutations).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn mutations(&self) -> Vec<Mutation> {
        self.mutations.read().unwrap().clone()
    }

    /// Forget recorded mutations.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear_mutations(&self) {
        self.mutations.write().unwrap().clear();
    }

    fn insert_dir_all(&self, dir: &str) {
        let mut dirs = self.dirs.write().unwrap();
        let mut current = dir;
        while !current.is_empty() {
            dirs.insert(current.to_owned());
            current = path::parent(current);
        }
    }

    fn record(&self, mutation: Mutation) {
        self.mutations.write().unwrap().push(mutation);
    }

    fn check(page_path: &str) -> Result<(), StorageError> {
        if path::is_valid(page_path) {
            Ok(())
        } else {
            Err(StorageError::invalid_path(page_path).with_backend(BACKEND))
        }
    }

    fn require_dir(&self, dir: &str) -> Result<(), StorageError> {
        if self.dirs.read().unwrap().contains(dir) {
            Ok(())
        } else {
            Err(StorageError::not_found(dir).with_backend(BACKEND))
        }
    }
}

impl PageStore for MockPageStore {
    fn scan(&self) -> Result<Vec<PageEntry>, StorageError> {
        Ok(self
            .pages
            .read()
            .unwrap()
            .iter()
            .map(|(page_path, page)| PageEntry {
                path: page_path.clone(),
                frontmatter: page.frontmatter.clone(),
            })
            .collect())
    }

    fn read(&self, page_path: &str) -> Result<Page, StorageError> {
        Self::check(page_path)?;
        self.page(page_path)
            .ok_or_else(|| StorageError::not_found(path::page_file(page_path)).with_backend(BACKEND))
    }

    fn write(&self, page_path: &str, page: &Page) -> Result<(), StorageError> {
        Self::check(page_path)?;
        self.require_dir(path::parent(page_path))?;
        self.pages
            .write()
            .unwrap()
            .insert(page_path.to_owned(), page.clone());
        self.record(Mutation::WritePage(page_path.to_owned()));
        Ok(())
    }

    fn delete(&self, page_path: &str) -> Result<(), StorageError> {
        Self::check(page_path)?;
        if self.pages.write().unwrap().remove(page_path).is_none() {
            return Err(StorageError::not_found(path::page_file(page_path)).with_backend(BACKEND));
        }
        self.record(Mutation::DeletePage(page_path.to_owned()));
        Ok(())
    }

    fn read_index(&self, dir: &str) -> Result<Option<Page>, StorageError> {
        Self::check(dir)?;
        Ok(self.index(dir))
    }

    fn write_index(&self, dir: &str, page: &Page) -> Result<(), StorageError> {
        Self::check(dir)?;
        self.require_dir(dir)?;
        self.indexes
            .write()
            .unwrap()
            .insert(dir.to_owned(), page.clone());
        self.record(Mutation::WriteIndex(dir.to_owned()));
        Ok(())
    }

    fn dir_exists(&self, dir: &str) -> bool {
        self.dirs.read().unwrap().contains(dir)
    }

    fn create_dir(&self, dir: &str) -> Result<(), StorageError> {
        Self::check(dir)?;
        self.require_dir(path::parent(dir))?;
        if !self.dirs.write().unwrap().insert(dir.to_owned()) {
            return Err(StorageError::new(StorageErrorKind::AlreadyExists)
                .with_path(dir)
                .with_backend(BACKEND));
        }
        self.record(Mutation::CreateDir(dir.to_owned()));
        Ok(())
    }

    fn remove_dir(&self, dir: &str) -> Result<(), StorageError> {
        Self::check(dir)?;
        if dir.is_empty() {
            return Err(StorageError::invalid_path(dir).with_backend(BACKEND));
        }
        if !self.list_dir(dir)?.is_empty() {
            return Err(StorageError::new(StorageErrorKind::Other)
                .with_path(dir)
                .with_backend(BACKEND));
        }
        self.indexes.write().unwrap().remove(dir);
        self.dirs.write().unwrap().remove(dir);
        self.record(Mutation::RemoveDir(dir.to_owned()));
        Ok(())
    }

    fn list_dir(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        Self::check(dir)?;
        self.require_dir(dir)?;

        let pages = self.pages.read().unwrap();
        let dirs = self.dirs.read().unwrap();
        let mut names: Vec<String> = pages
            .keys()
            .filter(|p| path::parent(p) == dir)
            .map(|p| path::page_file(path::base_name(p)))
            .chain(
                dirs.iter()
                    .filter(|d| !d.is_empty() && path::parent(d) == dir)
                    .map(|d| path::base_name(d).to_owned()),
            )
            .filter(|name| !name.starts_with('.'))
            .collect();
        names.sort();
        Ok(names)
    }
}
