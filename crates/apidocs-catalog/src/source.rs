//! Schema file discovery and loading.
//!
//! Schema files live at `<dir>/<version>/<filename>`; the directory name is
//! the version identifier. Files are read and parsed in parallel, then
//! folded into the catalog sequentially.

use std::fs;
use std::path::{Path, PathBuf};

use apidocs_versions::Registry;
use glob::{MatchOptions, Pattern};
use rayon::prelude::*;

use crate::builder::{Catalog, CatalogBuilder};
use crate::error::CatalogError;
use crate::schema::Schema;

/// A discovered schema file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFile {
    /// Version identifier (the parent directory name).
    pub version: String,
    /// Path to the schema file.
    pub path: PathBuf,
}

impl SchemaFile {
    /// Read and parse the file.
    fn load(&self) -> Result<Schema, CatalogError> {
        let content = fs::read_to_string(&self.path).map_err(|source| CatalogError::Io {
            path: self.path.clone(),
            source,
        })?;
        let schema = Schema::parse(&content).map_err(|source| CatalogError::Parse {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(version = %self.version, path = %self.path.display(), "Loaded schema");
        Ok(schema)
    }
}

/// Directory of version-scoped schema files.
#[derive(Debug, Clone)]
pub struct SchemaSource {
    dir: PathBuf,
    filename: String,
}

impl SchemaSource {
    /// Create a source reading `<dir>/<version>/<filename>`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            filename: filename.into(),
        }
    }

    /// Schema directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Find schema files, sorted by version.
    ///
    /// Hidden version directories are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingDirectory`] if the schema directory does
    /// not exist, or an I/O error if a directory cannot be read.
    pub fn discover(&self) -> Result<Vec<SchemaFile>, CatalogError> {
        if !self.dir.is_dir() {
            return Err(CatalogError::MissingDirectory(self.dir.clone()));
        }

        let pattern = format!(
            "{}/*/{}",
            Pattern::escape(&self.dir.to_string_lossy()),
            Pattern::escape(&self.filename)
        );
        let options = MatchOptions {
            require_literal_leading_dot: true,
            ..MatchOptions::default()
        };

        let mut files = Vec::new();
        for entry in glob::glob_with(&pattern, options)? {
            let path = entry.map_err(|e| CatalogError::Io {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;
            let Some(version) = path
                .parent()
                .and_then(Path::file_name)
                .map(|name| name.to_string_lossy().into_owned())
            else {
                continue;
            };
            files.push(SchemaFile { version, path });
        }
        files.sort_by(|a, b| a.version.cmp(&b.version));
        Ok(files)
    }

    /// Discover, read and aggregate every schema file.
    ///
    /// Files are read concurrently. The first failure aborts the build and
    /// no partial catalog is returned.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on discovery, read or parse failure, or when a
    /// version directory does not resolve through the registry.
    pub fn load(&self, registry: &Registry) -> Result<Catalog, CatalogError> {
        let files = self.discover()?;
        if files.is_empty() {
            tracing::warn!(dir = %self.dir.display(), filename = %self.filename, "No schema files found");
        }

        // Resolve versions before reading anything.
        for file in &files {
            registry.resolve(&file.version)?;
        }

        let schemas: Vec<(String, Schema)> = files
            .par_iter()
            .map(|file| file.load().map(|schema| (file.version.clone(), schema)))
            .collect::<Result<_, _>>()?;

        let mut builder = CatalogBuilder::new(registry);
        for (version, schema) in &schemas {
            builder.add(version, schema)?;
        }
        let catalog = builder.build();

        tracing::info!(
            versions = schemas.len(),
            categories = catalog.len(),
            subcategories = catalog.subcategory_count(),
            "Catalog built"
        );
        Ok(catalog)
    }
}
