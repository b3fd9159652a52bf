//! Directory index maintenance.

use std::collections::BTreeMap;

use apidocs_storage::{Page, PageStore, StorageError, path};

use crate::projector::FrontmatterDefaults;

/// Index child list operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOp {
    Add,
    Remove,
}

/// Adds and removes child references in directory index pages.
///
/// A directory without an index page gets a synthesized one titled after
/// the directory, carrying the frontmatter defaults.
pub struct IndexMaintainer<'a> {
    store: &'a dyn PageStore,
    defaults: &'a FrontmatterDefaults,
}

impl<'a> IndexMaintainer<'a> {
    #[must_use]
    pub fn new(store: &'a dyn PageStore, defaults: &'a FrontmatterDefaults) -> Self {
        Self { store, defaults }
    }

    /// Add the reference for `target` to its parent directory's index.
    ///
    /// `versions` is used only when the index has to be synthesized. An
    /// existing reference is not duplicated.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the index can't be read or written.
    pub fn add(&self, target: &str, versions: &BTreeMap<String, String>) -> Result<(), StorageError> {
        self.update(target, IndexOp::Add, versions)
    }

    /// Remove the reference for `target` from its parent directory's index.
    ///
    /// A missing reference is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the index can't be read or written.
    pub fn remove(&self, target: &str) -> Result<(), StorageError> {
        self.update(target, IndexOp::Remove, &BTreeMap::new())
    }

    /// Apply `op` for `target` to the index of `dirname(target)`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the index can't be read or written.
    pub fn update(
        &self,
        target: &str,
        op: IndexOp,
        versions: &BTreeMap<String, String>,
    ) -> Result<(), StorageError> {
        let dir = path::parent(target);
        let reference = path::child_reference(target);

        let mut index = match self.store.read_index(dir)? {
            Some(index) => index,
            None => {
                tracing::warn!(dir, "Index page missing, synthesizing");
                self.synthesize(dir, versions)
            }
        };

        let children = index.frontmatter.children.get_or_insert_with(Vec::new);
        match op {
            IndexOp::Add => {
                if !children.contains(&reference) {
                    children.push(reference);
                }
            }
            IndexOp::Remove => {
                if let Some(pos) = children.iter().position(|c| *c == reference) {
                    children.remove(pos);
                }
            }
        }

        tracing::debug!(dir, target, ?op, "Updating index");
        self.store.write_index(dir, &index)
    }

    fn synthesize(&self, dir: &str, versions: &BTreeMap<String, String>) -> Page {
        let mut frontmatter = self
            .defaults
            .frontmatter(path::base_name(dir), versions.clone());
        frontmatter.children = Some(Vec::new());
        Page::new(frontmatter, "")
    }
}
