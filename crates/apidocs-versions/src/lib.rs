//! Release lines and version range compaction for apidocs.
//!
//! A product ships on one or more *release lines*. Some lines are flag-style
//! (the version either applies or it does not), others are numbered and carry
//! an ordered list of releases. This crate provides:
//!
//! - [`ReleaseLine`] and [`Registry`]: the table of known lines, validated at
//!   construction, resolving version identifiers to [`VersionTag`]s
//! - [`VersionSet`]: the set of versions a catalog entry appears in
//! - [`compact`]: turns a [`VersionSet`] into one [`RangeExpression`] per line
//!
//! # Example
//!
//! ```
//! use apidocs_versions::{Registry, ReleaseLine, VersionSet, versions_map};
//!
//! let registry = Registry::new(vec![
//!     ReleaseLine::flag("fpt"),
//!     ReleaseLine::numbered("ghes", ["3.3", "3.4", "3.5"], "3.5"),
//! ])
//! .unwrap();
//!
//! let mut set = VersionSet::new();
//! for id in ["fpt", "ghes-3.3", "ghes-3.4"] {
//!     set.insert(registry.resolve(id).unwrap());
//! }
//!
//! let versions = versions_map(&set, &registry).unwrap();
//! assert_eq!(versions["fpt"], "*");
//! assert_eq!(versions["ghes"], "<=3.4");
//! ```

mod range;
mod registry;
mod release;
mod tag;

pub use range::{RangeExpression, compact, versions_map};
pub use registry::{Registry, RegistryError, UnknownVersionError};
pub use release::{ReleaseLine, compare_releases};
pub use tag::{VersionSet, VersionTag};
