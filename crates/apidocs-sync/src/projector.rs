//! Catalog to page set projection.

use std::collections::BTreeMap;

use apidocs_catalog::Catalog;
use apidocs_storage::{Frontmatter, path};
use apidocs_versions::{Registry, versions_map};

use crate::error::SyncError;

/// Fixed frontmatter applied to every generated page.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontmatterDefaults {
    /// Value of the `autogenerated` key on generated pages.
    pub marker: String,
    /// Extra keys merged into generated frontmatter.
    pub fields: BTreeMap<String, serde_yaml::Value>,
}

impl FrontmatterDefaults {
    #[must_use]
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a default field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_yaml::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Frontmatter for a generated entry named `name`.
    ///
    /// Title and short title are the name, the intro is empty, and the
    /// defaults and marker are merged in.
    #[must_use]
    pub fn frontmatter(&self, name: &str, versions: BTreeMap<String, String>) -> Frontmatter {
        Frontmatter {
            title: Some(name.to_owned()),
            short_title: Some(name.to_owned()),
            intro: Some(String::new()),
            versions,
            autogenerated: Some(self.marker.clone()),
            children: None,
            extra: self.fields.clone(),
        }
    }
}

/// Desired page set: page path to generated frontmatter, sorted by path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesiredPages {
    pages: BTreeMap<String, Frontmatter>,
}

impl DesiredPages {
    /// Desired frontmatter for a page.
    #[must_use]
    pub fn get(&self, page_path: &str) -> Option<&Frontmatter> {
        self.pages.get(page_path)
    }

    #[must_use]
    pub fn contains(&self, page_path: &str) -> bool {
        self.pages.contains_key(page_path)
    }

    /// Iterate over pages in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Frontmatter)> {
        self.pages.iter().map(|(p, fm)| (p.as_str(), fm))
    }

    /// Page paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Project the catalog onto page paths.
///
/// A category with a single subcategory becomes a page named after the
/// category at the content root. A category with several subcategories
/// becomes a directory holding one page per subcategory.
///
/// # Errors
///
/// Returns [`SyncError::UnknownVersion`] if a catalog version refers to a
/// line the registry does not know, and [`SyncError::InvalidName`] if a
/// category or subcategory can't be stored as a page (hidden, containing
/// `/`, or colliding with an index or readme file).
pub fn project(
    catalog: &Catalog,
    registry: &Registry,
    defaults: &FrontmatterDefaults,
) -> Result<DesiredPages, SyncError> {
    let mut pages = BTreeMap::new();

    for (category, subcategories) in catalog.categories() {
        let single = subcategories.len() == 1;
        for (subcategory, set) in subcategories {
            let (page_path, names) = if single {
                (category.to_owned(), vec![category])
            } else {
                (path::join(category, subcategory), vec![category, subcategory.as_str()])
            };
            check_page_path(&page_path, &names)?;
            let versions = versions_map(set, registry)?;
            let frontmatter = defaults.frontmatter(path::base_name(&page_path), versions);
            pages.insert(page_path, frontmatter);
        }
    }

    tracing::debug!(pages = pages.len(), "Projected catalog");
    Ok(DesiredPages { pages })
}

/// Reject names the store would hide, nest or mistake for an index page.
fn check_page_path(page_path: &str, names: &[&str]) -> Result<(), SyncError> {
    let unsafe_name = names
        .iter()
        .any(|name| name.is_empty() || name.starts_with('.') || name.contains('/'));
    let reserved = path::is_reserved(&path::page_file(path::base_name(page_path)));
    if unsafe_name || reserved || !path::is_valid(page_path) {
        return Err(SyncError::InvalidName {
            path: page_path.to_owned(),
        });
    }
    Ok(())
}
