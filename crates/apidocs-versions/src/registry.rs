//! Release line registry.
//!
//! The registry is the static table of known release lines. Version
//! identifiers (schema directory names such as `fpt`, `api.github.com` or
//! `ghes-3.5`) resolve through it to a [`VersionTag`].

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::release::{ReleaseLine, compare_releases};
use crate::tag::VersionTag;

/// Version identifier with no matching release line or release.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown version: {identifier}")]
pub struct UnknownVersionError {
    /// The identifier that failed to resolve.
    pub identifier: String,
}

impl UnknownVersionError {
    fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }
}

/// Invalid release line table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Release line identifier cannot be empty")]
    EmptyIdentifier,

    #[error("Identifier {0} is used by more than one release line")]
    DuplicateIdentifier(String),

    #[error("Release line {line} is numbered but lists no releases")]
    EmptyReleases { line: String },

    #[error("Release line {line} lists release {release} more than once")]
    DuplicateRelease { line: String, release: String },

    #[error("Release line {line} is numbered but has no current release")]
    MissingCurrent { line: String },

    #[error("Release line {line} has current release {current} which is not among its releases")]
    CurrentNotListed { line: String, current: String },

    #[error("Release line {line} is not numbered but lists releases")]
    UnexpectedReleases { line: String },
}

/// Validated table of release lines.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Lines keyed by id, releases sorted ascending.
    lines: BTreeMap<String, ReleaseLine>,
    /// Line id for every id and alias.
    names: HashMap<String, String>,
}

impl Registry {
    /// Build a registry from release lines.
    ///
    /// Releases of numbered lines are sorted ascending by
    /// [`compare_releases`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if identifiers collide, a numbered line has
    /// no releases or duplicate releases, its current release is missing or
    /// not listed, or a flag-style line lists releases.
    pub fn new(lines: impl IntoIterator<Item = ReleaseLine>) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for mut line in lines {
            Self::validate_line(&line)?;
            line.releases.sort_by(|a, b| compare_releases(a, b));

            for name in std::iter::once(&line.id).chain(&line.aliases) {
                if name.is_empty() {
                    return Err(RegistryError::EmptyIdentifier);
                }
                if registry
                    .names
                    .insert(name.clone(), line.id.clone())
                    .is_some()
                {
                    return Err(RegistryError::DuplicateIdentifier(name.clone()));
                }
            }
            registry.lines.insert(line.id.clone(), line);
        }
        Ok(registry)
    }

    fn validate_line(line: &ReleaseLine) -> Result<(), RegistryError> {
        if line.id.is_empty() {
            return Err(RegistryError::EmptyIdentifier);
        }
        let name = || line.id.clone();

        if !line.numbered {
            if !line.releases.is_empty() {
                return Err(RegistryError::UnexpectedReleases { line: name() });
            }
            return Ok(());
        }

        if line.releases.is_empty() {
            return Err(RegistryError::EmptyReleases { line: name() });
        }
        let mut seen = HashSet::new();
        for release in &line.releases {
            if !seen.insert(release.as_str()) {
                return Err(RegistryError::DuplicateRelease {
                    line: name(),
                    release: release.clone(),
                });
            }
        }
        let current = line
            .current
            .as_ref()
            .ok_or_else(|| RegistryError::MissingCurrent { line: name() })?;
        if !seen.contains(current.as_str()) {
            return Err(RegistryError::CurrentNotListed {
                line: name(),
                current: current.clone(),
            });
        }
        Ok(())
    }

    /// Resolve a version identifier.
    ///
    /// - An id or alias of a flag-style line resolves to that line.
    /// - `<id-or-alias>-<release>` resolves to a numbered line's release.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownVersionError`] if no line or release matches.
    pub fn resolve(&self, identifier: &str) -> Result<VersionTag, UnknownVersionError> {
        if let Some(line) = self.line_by_name(identifier)
            && !line.numbered
        {
            return Ok(VersionTag::new(line.id.clone(), None));
        }

        // Try every dash so aliases and releases may themselves contain dashes.
        for (idx, _) in identifier.match_indices('-') {
            let (prefix, release) = (&identifier[..idx], &identifier[idx + 1..]);
            if let Some(line) = self.line_by_name(prefix)
                && line.numbered
                && line.position(release).is_some()
            {
                return Ok(VersionTag::new(line.id.clone(), Some(release.to_owned())));
            }
        }

        Err(UnknownVersionError::new(identifier))
    }

    /// Look up a line by id.
    #[must_use]
    pub fn line(&self, id: &str) -> Option<&ReleaseLine> {
        self.lines.get(id)
    }

    /// All lines, sorted by id.
    pub fn lines(&self) -> impl Iterator<Item = &ReleaseLine> {
        self.lines.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn line_by_name(&self, name: &str) -> Option<&ReleaseLine> {
        self.names.get(name).and_then(|id| self.lines.get(id))
    }
}
