//! Version tags and version sets.

use std::collections::BTreeSet;

/// A resolved version identifier.
///
/// Carries the line it belongs to and, for numbered lines, the release.
/// Tags are produced by [`Registry::resolve`](crate::Registry::resolve).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionTag {
    line: String,
    release: Option<String>,
}

impl VersionTag {
    /// Create a tag for a line and optional release.
    #[must_use]
    pub fn new(line: impl Into<String>, release: Option<String>) -> Self {
        Self {
            line: line.into(),
            release,
        }
    }

    /// Line identifier.
    #[must_use]
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Release on a numbered line, `None` for flag-style lines.
    #[must_use]
    pub fn release(&self) -> Option<&str> {
        self.release.as_deref()
    }
}

/// Deduplicated, unordered set of versions a catalog entry appears in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VersionSet {
    tags: BTreeSet<VersionTag>,
}

impl VersionSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag. Returns `false` if it was already present.
    pub fn insert(&mut self, tag: VersionTag) -> bool {
        self.tags.insert(tag)
    }

    #[must_use]
    pub fn contains(&self, tag: &VersionTag) -> bool {
        self.tags.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VersionTag> {
        self.tags.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl FromIterator<VersionTag> for VersionSet {
    fn from_iter<T: IntoIterator<Item = VersionTag>>(iter: T) -> Self {
        Self {
            tags: iter.into_iter().collect(),
        }
    }
}

impl Extend<VersionTag> for VersionSet {
    fn extend<T: IntoIterator<Item = VersionTag>>(&mut self, iter: T) {
        self.tags.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_deduplicates() {
        let mut set = VersionSet::new();
        assert!(set.insert(VersionTag::new("ghes", Some("3.4".to_owned()))));
        assert!(!set.insert(VersionTag::new("ghes", Some("3.4".to_owned()))));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_insertion_order_is_irrelevant() {
        let a: VersionSet = [
            VersionTag::new("fpt", None),
            VersionTag::new("ghes", Some("3.5".to_owned())),
        ]
        .into_iter()
        .collect();
        let b: VersionSet = [
            VersionTag::new("ghes", Some("3.5".to_owned())),
            VersionTag::new("fpt", None),
        ]
        .into_iter()
        .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_tag_accessors() {
        let tag = VersionTag::new("ghes", Some("3.3".to_owned()));
        assert_eq!(tag.line(), "ghes");
        assert_eq!(tag.release(), Some("3.3"));
        assert_eq!(VersionTag::new("fpt", None).release(), None);
    }
}
