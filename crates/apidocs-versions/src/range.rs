//! Version range compaction.
//!
//! Converts the set of versions a catalog entry appears in into one compact
//! expression per release line:
//!
//! - `*` when every known release of the line is present (always, for
//!   flag-style lines)
//! - `>=a`, `<=b` or `<=b >=a` when the present releases form one contiguous
//!   window that is only truncated at the ends
//! - `=a || =b` when there are gaps between present releases
//!
//! Bounds are preferred over enumeration whenever the gap pattern allows it,
//! which keeps generated frontmatter stable across releases.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::registry::{Registry, UnknownVersionError};
use crate::release::{ReleaseLine, compare_releases};
use crate::tag::VersionSet;

/// Availability of a page on one release line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RangeExpression {
    /// Every known release.
    All,
    /// A contiguous window truncated at the start (`min`), end (`max`), or both.
    Bounds {
        min: Option<String>,
        max: Option<String>,
    },
    /// Exactly these releases, ascending.
    Exact(Vec<String>),
}

impl RangeExpression {
    /// Whether `release` of `line` falls inside this expression.
    #[must_use]
    pub fn selects(&self, line: &ReleaseLine, release: &str) -> bool {
        if line.numbered && line.position(release).is_none() {
            return false;
        }
        match self {
            Self::All => true,
            Self::Bounds { min, max } => {
                let above = min
                    .as_deref()
                    .is_none_or(|min| compare_releases(release, min) != Ordering::Less);
                let below = max
                    .as_deref()
                    .is_none_or(|max| compare_releases(release, max) != Ordering::Greater);
                above && below
            }
            Self::Exact(releases) => releases.iter().any(|r| r == release),
        }
    }

    /// The releases of `line` this expression selects, ascending.
    #[must_use]
    pub fn evaluate<'a>(&self, line: &'a ReleaseLine) -> Vec<&'a str> {
        line.releases
            .iter()
            .map(String::as_str)
            .filter(|release| self.selects(line, release))
            .collect()
    }
}

impl fmt::Display for RangeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("*"),
            Self::Bounds { min, max } => {
                let bounds: Vec<String> = max
                    .iter()
                    .map(|max| format!("<={max}"))
                    .chain(min.iter().map(|min| format!(">={min}")))
                    .collect();
                f.write_str(&bounds.join(" "))
            }
            Self::Exact(releases) => {
                let terms: Vec<String> = releases.iter().map(|r| format!("={r}")).collect();
                f.write_str(&terms.join(" || "))
            }
        }
    }
}

/// Compact a version set into one expression per release line.
///
/// Lines the set does not touch are omitted. The map is keyed by line id,
/// so iteration order is sorted.
///
/// # Errors
///
/// Returns [`UnknownVersionError`] if a tag refers to a line the registry
/// does not know.
pub fn compact(
    set: &VersionSet,
    registry: &Registry,
) -> Result<BTreeMap<String, RangeExpression>, UnknownVersionError> {
    let mut present: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for tag in set.iter() {
        let releases = present.entry(tag.line()).or_default();
        if let Some(release) = tag.release() {
            releases.insert(release);
        }
    }

    let mut ranges = BTreeMap::new();
    for (line_id, releases) in present {
        let line = registry.line(line_id).ok_or_else(|| UnknownVersionError {
            identifier: line_id.to_owned(),
        })?;

        let expression = if line.numbered {
            let slots: Vec<Option<&str>> = line
                .releases
                .iter()
                .map(|r| releases.contains(r.as_str()).then_some(r.as_str()))
                .collect();
            compact_slots(&slots)
        } else {
            Some(RangeExpression::All)
        };

        if let Some(expression) = expression {
            ranges.insert(line_id.to_owned(), expression);
        }
    }
    Ok(ranges)
}

/// Like [`compact`], rendered to frontmatter strings.
///
/// # Errors
///
/// Returns [`UnknownVersionError`] if a tag refers to an unknown line.
pub fn versions_map(
    set: &VersionSet,
    registry: &Registry,
) -> Result<BTreeMap<String, String>, UnknownVersionError> {
    Ok(compact(set, registry)?
        .into_iter()
        .map(|(line, range)| (line, range.to_string()))
        .collect())
}

/// Compact one numbered line given its release slots in ascending order.
///
/// `None` marks a release that is not present. Returns `None` when nothing
/// is present.
fn compact_slots(slots: &[Option<&str>]) -> Option<RangeExpression> {
    let first = slots.iter().position(Option::is_some)?;
    let last = slots.iter().rposition(Option::is_some)?;

    if slots.iter().all(Option::is_some) {
        return Some(RangeExpression::All);
    }

    // Holes only at the ends: one contiguous window.
    if slots[first..=last].iter().all(Option::is_some) {
        let min = if first > 0 { slots[first] } else { None };
        let max = if last < slots.len() - 1 { slots[last] } else { None };
        return Some(RangeExpression::Bounds {
            min: min.map(str::to_owned),
            max: max.map(str::to_owned),
        });
    }

    Some(RangeExpression::Exact(
        slots.iter().flatten().map(|r| (*r).to_owned()).collect(),
    ))
}
