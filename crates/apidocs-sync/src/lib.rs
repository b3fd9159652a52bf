//! Catalog projection and page tree reconciliation for apidocs.
//!
//! Turns a [`Catalog`](apidocs_catalog::Catalog) into the set of pages the
//! documentation tree should contain and brings a [`PageStore`] in line
//! with it:
//!
//! - [`project`]: catalog to [`DesiredPages`]
//! - [`Reconciler`]: plans and applies create, update and delete steps
//! - [`IndexMaintainer`]: keeps each directory's index child list current
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use apidocs_storage::FsPageStore;
//! use apidocs_sync::{FrontmatterDefaults, Reconciler, project};
//!
//! let defaults = FrontmatterDefaults::new("rest");
//! let desired = project(&catalog, &registry, &defaults)?;
//! let reconciler = Reconciler::new(Arc::new(FsPageStore::new("content/rest")), defaults);
//! let report = reconciler.apply(&desired)?;
//! ```
//!
//! [`PageStore`]: apidocs_storage::PageStore

mod error;
mod index;
mod projector;
mod reconciler;

pub use error::SyncError;
pub use index::{IndexMaintainer, IndexOp};
pub use projector::{DesiredPages, FrontmatterDefaults, project};
pub use reconciler::{Reconciler, SyncPlan, SyncReport};
