//! Catalog aggregation.

use std::collections::BTreeMap;

use apidocs_versions::{Registry, UnknownVersionError, VersionSet};

use crate::schema::Schema;

/// Category → subcategory → versions the subcategory appears in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: BTreeMap<String, BTreeMap<String, VersionSet>>,
}

impl Catalog {
    /// Iterate over categories and their subcategories.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, VersionSet>)> {
        self.entries
            .iter()
            .map(|(category, subcategories)| (category.as_str(), subcategories))
    }

    /// Subcategories of a category.
    #[must_use]
    pub fn subcategories(&self, category: &str) -> Option<&BTreeMap<String, VersionSet>> {
        self.entries.get(category)
    }

    /// Versions a subcategory appears in.
    #[must_use]
    pub fn versions(&self, category: &str, subcategory: &str) -> Option<&VersionSet> {
        self.entries.get(category)?.get(subcategory)
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of (category, subcategory) entries.
    #[must_use]
    pub fn subcategory_count(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }
}

/// Folds schemas from many versions into a [`Catalog`].
///
/// The order in which schemas are added does not affect the result.
pub struct CatalogBuilder<'a> {
    registry: &'a Registry,
    catalog: Catalog,
}

impl<'a> CatalogBuilder<'a> {
    #[must_use]
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            catalog: Catalog::default(),
        }
    }

    /// Record every pair in `schema` as present in `version`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownVersionError`] if the registry cannot resolve `version`.
    /// The builder is left unchanged in that case.
    pub fn add(&mut self, version: &str, schema: &Schema) -> Result<&mut Self, UnknownVersionError> {
        let tag = self.registry.resolve(version)?;
        for (category, subcategory) in schema.pairs() {
            self.catalog
                .entries
                .entry(category.to_owned())
                .or_default()
                .entry(subcategory.to_owned())
                .or_default()
                .insert(tag.clone());
        }
        Ok(self)
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Catalog {
        self.catalog
    }
}
