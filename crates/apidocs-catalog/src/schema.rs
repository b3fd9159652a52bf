//! Schema file parsing.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::IgnoredAny;

/// Category and subcategory presence from one schema file.
///
/// The schema is a JSON object of categories, each an object keyed by
/// subcategory. Subcategory values are structural markers and are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    categories: BTreeMap<String, BTreeSet<String>>,
}

impl Schema {
    /// Parse schema JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not an object of objects.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        let raw: BTreeMap<String, BTreeMap<String, IgnoredAny>> = serde_json::from_str(content)?;
        Ok(Self {
            categories: raw
                .into_iter()
                .map(|(category, subcategories)| (category, subcategories.into_keys().collect()))
                .collect(),
        })
    }

    /// Iterate over `(category, subcategory)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.categories.iter().flat_map(|(category, subcategories)| {
            subcategories
                .iter()
                .map(move |subcategory| (category.as_str(), subcategory.as_str()))
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl<C, S> FromIterator<(C, S)> for Schema
where
    C: Into<String>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (C, S)>>(iter: T) -> Self {
        let mut categories: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (category, subcategory) in iter {
            categories
                .entry(category.into())
                .or_default()
                .insert(subcategory.into());
        }
        Self { categories }
    }
}
