//! Release line definitions.

use std::cmp::Ordering;

use serde::Deserialize;

/// A product release line.
///
/// Flag-style lines (`numbered = false`) have no releases: a page either
/// applies to the line or it does not. Numbered lines list their releases;
/// the [`Registry`](crate::Registry) keeps them sorted ascending.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ReleaseLine {
    /// Short line identifier (e.g., "fpt", "ghes").
    pub id: String,
    /// Whether the line has ordered, numbered releases.
    #[serde(default)]
    pub numbered: bool,
    /// Known releases (numbered lines only).
    #[serde(default)]
    pub releases: Vec<String>,
    /// Current release (numbered lines only).
    #[serde(default)]
    pub current: Option<String>,
    /// Extra identifiers that resolve to this line (e.g., "api.github.com").
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl ReleaseLine {
    /// Create a flag-style line.
    #[must_use]
    pub fn flag(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            numbered: false,
            releases: Vec::new(),
            current: None,
            aliases: Vec::new(),
        }
    }

    /// Create a numbered line.
    #[must_use]
    pub fn numbered<I, S>(id: impl Into<String>, releases: I, current: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            numbered: true,
            releases: releases.into_iter().map(Into::into).collect(),
            current: Some(current.into()),
            aliases: Vec::new(),
        }
    }

    /// Add identifiers that resolve to this line.
    #[must_use]
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Position of `release` in the release list.
    #[must_use]
    pub fn position(&self, release: &str) -> Option<usize> {
        self.releases.iter().position(|r| r == release)
    }
}

/// Compare two release strings in release order.
///
/// Releases are split on `.`; components that are both numeric compare as
/// numbers, anything else compares lexically. A release with more
/// components sorts after its prefix (`3.4` < `3.4.1`).
#[must_use]
pub fn compare_releases(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ord = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    _ => l.cmp(r),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_releases_numeric_components() {
        assert_eq!(compare_releases("3.9", "3.10"), Ordering::Less);
        assert_eq!(compare_releases("3.10", "3.9"), Ordering::Greater);
        assert_eq!(compare_releases("2.22", "3.0"), Ordering::Less);
        assert_eq!(compare_releases("3.5", "3.5"), Ordering::Equal);
    }

    #[test]
    fn test_compare_releases_prefix_sorts_first() {
        assert_eq!(compare_releases("3.4", "3.4.1"), Ordering::Less);
        assert_eq!(compare_releases("3.4.1", "3.4"), Ordering::Greater);
    }

    #[test]
    fn test_compare_releases_non_numeric_falls_back_to_lexical() {
        assert_eq!(compare_releases("3.x", "3.y"), Ordering::Less);
        assert_eq!(compare_releases("latest", "latest"), Ordering::Equal);
    }

    #[test]
    fn test_flag_line() {
        let line = ReleaseLine::flag("fpt");
        assert_eq!(line.id, "fpt");
        assert!(!line.numbered);
        assert!(line.releases.is_empty());
        assert!(line.current.is_none());
    }

    #[test]
    fn test_numbered_line_with_aliases() {
        let line = ReleaseLine::numbered("ghes", ["3.3", "3.4"], "3.4")
            .with_aliases(["enterprise-server"]);
        assert!(line.numbered);
        assert_eq!(line.releases, vec!["3.3".to_owned(), "3.4".to_owned()]);
        assert_eq!(line.current.as_deref(), Some("3.4"));
        assert_eq!(line.aliases, vec!["enterprise-server".to_owned()]);
        assert_eq!(line.position("3.4"), Some(1));
        assert_eq!(line.position("3.9"), None);
    }
}
