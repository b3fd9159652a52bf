//! Documentation page tree storage for apidocs.
//!
//! This crate provides a [`PageStore`] trait abstracting reads and writes of
//! the documentation tree from the underlying backend. This enables:
//!
//! - **Unit testing** of reconciliation without touching the real filesystem
//! - **Clean separation** between sync logic and I/O operations
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Page`] and [`Frontmatter`]: the page text format (YAML block + body)
//! - [`PageStore`] trait for page and index I/O and directory handling
//! - [`FsPageStore`] implementation for a directory on disk
//! - [`MockPageStore`] in-memory implementation with a mutation log (behind
//!   the `mock` feature flag)
//!
//! # Path Convention
//!
//! Pages are addressed by slash-separated paths relative to the content
//! root, without extension:
//! - `"actions"` - page `actions.md`
//! - `"actions/artifacts"` - page `actions/artifacts.md`
//!
//! Directories use the same convention (`""` is the root) and each may hold
//! one index page, `index.md`.
//!
//! # Example
//!
//! ```ignore
//! use apidocs_storage::{FsPageStore, PageStore};
//!
//! let store = FsPageStore::new("content/rest");
//! for entry in store.scan()? {
//!     println!("{}", entry.path);
//! }
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod page;
pub mod path;
mod storage;

pub use fs::FsPageStore;
#[cfg(feature = "mock")]
pub use mock::{MockPageStore, Mutation};
pub use page::{Frontmatter, FrontmatterError, Page};
pub use storage::{PageEntry, PageStore, StorageError, StorageErrorKind};
