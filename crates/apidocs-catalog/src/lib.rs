//! API category catalog for apidocs.
//!
//! Every product version ships one schema file describing which API
//! categories and subcategories exist in that version. This crate folds
//! those files into a [`Catalog`]: category → subcategory → [`VersionSet`].
//!
//! # Architecture
//!
//! - [`Schema`]: presence data parsed from one schema file
//! - [`CatalogBuilder`]: order-independent aggregation of schemas
//! - [`SchemaSource`]: discovers `<dir>/<version>/<filename>` files and
//!   loads them in parallel
//!
//! [`VersionSet`]: apidocs_versions::VersionSet

mod builder;
mod error;
mod schema;
mod source;

pub use builder::{Catalog, CatalogBuilder};
pub use error::CatalogError;
pub use schema::Schema;
pub use source::{SchemaFile, SchemaSource};
