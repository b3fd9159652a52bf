//! Page tree reconciliation.
//!
//! Diffs the desired page set against the generated pages already in the
//! tree and applies the difference:
//!
//! 1. Generated pages no longer desired are deleted. A directory left with
//!    only its index page is removed together with its reference in the
//!    parent index.
//! 2. Desired pages that exist have their `versions` replaced when they
//!    differ. Everything else on the page is kept.
//! 3. Desired pages that don't exist are created, introducing missing
//!    directories first. Each new entry is referenced from its parent index.
//!
//! Mutations are applied one at a time in a fixed order (removals, then
//! upserts, each sorted by path). Directory collapse detection depends on the
//! state left by earlier steps.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use apidocs_storage::{Frontmatter, Page, PageStore, path};

use crate::error::SyncError;
use crate::index::IndexMaintainer;
use crate::projector::{DesiredPages, FrontmatterDefaults};

/// Changes reconciliation would make, without applying them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// Pages to create.
    pub create: Vec<String>,
    /// Existing pages whose versions change.
    pub update: Vec<String>,
    /// Existing pages already up to date.
    pub unchanged: Vec<String>,
    /// Generated pages to delete.
    pub remove: Vec<String>,
}

impl SyncPlan {
    /// Whether applying the plan would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.remove.is_empty()
    }
}

/// Changes made by [`Reconciler::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
    pub created_dirs: Vec<String>,
    pub removed_dirs: Vec<String>,
}

impl SyncReport {
    /// Whether nothing was changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.updated.is_empty()
            && self.removed.is_empty()
            && self.created_dirs.is_empty()
            && self.removed_dirs.is_empty()
    }
}

/// Reconciles a page store with a desired page set.
pub struct Reconciler {
    store: Arc<dyn PageStore>,
    defaults: FrontmatterDefaults,
}

impl Reconciler {
    #[must_use]
    pub fn new(store: Arc<dyn PageStore>, defaults: FrontmatterDefaults) -> Self {
        Self { store, defaults }
    }

    /// Compute the changes needed to reach `desired`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if the page tree can't be scanned.
    pub fn plan(&self, desired: &DesiredPages) -> Result<SyncPlan, SyncError> {
        let existing: BTreeMap<String, Frontmatter> = self
            .store
            .scan()?
            .into_iter()
            .map(|entry| (entry.path, entry.frontmatter))
            .collect();

        let mut plan = SyncPlan {
            remove: existing
                .iter()
                .filter(|(p, fm)| fm.is_autogenerated(&self.defaults.marker) && !desired.contains(p))
                .map(|(p, _)| p.clone())
                .collect(),
            ..SyncPlan::default()
        };

        for (page_path, frontmatter) in desired.iter() {
            let bucket = match existing.get(page_path) {
                None => &mut plan.create,
                Some(current) if current.versions != frontmatter.versions => &mut plan.update,
                Some(_) => &mut plan.unchanged,
            };
            bucket.push(page_path.to_owned());
        }

        Ok(plan)
    }

    /// Bring the page tree in line with `desired`.
    ///
    /// The first failure aborts the run. Mutations already applied stay.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] on any storage failure.
    pub fn apply(&self, desired: &DesiredPages) -> Result<SyncReport, SyncError> {
        let plan = self.plan(desired)?;
        let mut report = SyncReport::default();

        for page_path in &plan.remove {
            self.remove_page(page_path, &mut report)?;
        }

        let updates: BTreeSet<&str> = plan.update.iter().map(String::as_str).collect();
        let creates: BTreeSet<&str> = plan.create.iter().map(String::as_str).collect();
        for (page_path, frontmatter) in desired.iter() {
            if creates.contains(page_path) {
                self.create_page(page_path, frontmatter, &mut report)?;
            } else if updates.contains(page_path) {
                self.update_page(page_path, frontmatter, &mut report)?;
            }
        }

        tracing::info!(
            created = report.created.len(),
            updated = report.updated.len(),
            removed = report.removed.len(),
            unchanged = plan.unchanged.len(),
            "Page tree reconciled"
        );
        Ok(report)
    }

    fn index(&self) -> IndexMaintainer<'_> {
        IndexMaintainer::new(self.store.as_ref(), &self.defaults)
    }

    fn remove_page(&self, page_path: &str, report: &mut SyncReport) -> Result<(), SyncError> {
        tracing::debug!(page = page_path, "Deleting page");
        self.store.delete(page_path)?;
        report.removed.push(page_path.to_owned());

        let dir = path::parent(page_path);
        if !dir.is_empty() && self.store.list_dir(dir)?.is_empty() {
            tracing::debug!(dir, "Removing empty directory");
            self.store.remove_dir(dir)?;
            self.index().remove(dir)?;
            report.removed_dirs.push(dir.to_owned());
        } else {
            self.index().remove(page_path)?;
        }
        Ok(())
    }

    fn update_page(
        &self,
        page_path: &str,
        frontmatter: &Frontmatter,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        tracing::debug!(page = page_path, "Updating page versions");
        let mut page = self.store.read(page_path)?;
        page.frontmatter.versions.clone_from(&frontmatter.versions);
        self.store.write(page_path, &page)?;
        report.updated.push(page_path.to_owned());
        Ok(())
    }

    fn create_page(
        &self,
        page_path: &str,
        frontmatter: &Frontmatter,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        self.create_dirs(path::parent(page_path), &frontmatter.versions, report)?;

        tracing::debug!(page = page_path, "Creating page");
        self.store
            .write(page_path, &Page::new(frontmatter.clone(), ""))?;
        self.index().add(page_path, &frontmatter.versions)?;
        report.created.push(page_path.to_owned());
        Ok(())
    }

    /// Create `dir` and any missing ancestors, outermost first.
    fn create_dirs(
        &self,
        dir: &str,
        versions: &BTreeMap<String, String>,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let mut missing = Vec::new();
        let mut current = dir;
        while !current.is_empty() && !self.store.dir_exists(current) {
            missing.push(current);
            current = path::parent(current);
        }

        for dir in missing.into_iter().rev() {
            tracing::debug!(dir, "Creating directory");
            self.store.create_dir(dir)?;
            self.index().add(dir, versions)?;
            report.created_dirs.push(dir.to_owned());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use apidocs_catalog::{Catalog, CatalogBuilder, Schema};
    use apidocs_storage::{FsPageStore, MockPageStore, Mutation};
    use apidocs_versions::{Registry, ReleaseLine};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::projector::project;

    fn registry() -> Registry {
        Registry::new(vec![
            ReleaseLine::flag("fpt").with_aliases(["api.github.com"]),
            ReleaseLine::numbered("ghes", ["3.3", "3.4", "3.5"], "3.5"),
        ])
        .unwrap()
    }

    fn catalog(registry: &Registry, schemas: &[(&str, &[(&str, &str)])]) -> Catalog {
        let mut builder = CatalogBuilder::new(registry);
        for (version, pairs) in schemas {
            builder
                .add(version, &pairs.iter().copied().collect::<Schema>())
                .unwrap();
        }
        builder.build()
    }

    fn desired(schemas: &[(&str, &[(&str, &str)])]) -> DesiredPages {
        let registry = registry();
        project(&catalog(&registry, schemas), &registry, &FrontmatterDefaults::new("rest")).unwrap()
    }

    fn generated(title: &str, versions: &[(&str, &str)]) -> Page {
        let defaults = FrontmatterDefaults::new("rest");
        let versions = versions
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Page::new(defaults.frontmatter(title, versions), "")
    }

    fn index_with(children: &[&str]) -> Page {
        Page::new(
            Frontmatter {
                title: Some("REST".to_owned()),
                children: Some(children.iter().map(|c| (*c).to_owned()).collect()),
                ..Frontmatter::default()
            },
            "",
        )
    }

    fn children(page: &Page) -> Vec<String> {
        page.frontmatter.children.clone().unwrap_or_default()
    }

    fn reconciler(store: &Arc<MockPageStore>) -> Reconciler {
        Reconciler::new(Arc::clone(store) as Arc<dyn PageStore>, FrontmatterDefaults::new("rest"))
    }

    #[test]
    fn test_reconciler_is_send_sync() {
        static_assertions::assert_impl_all!(Reconciler: Send, Sync);
    }

    #[test]
    fn test_creates_pages_in_empty_tree() {
        let store = Arc::new(MockPageStore::new().with_index("", index_with(&[])));
        let pages = desired(&[("fpt", &[("meta", "meta"), ("actions", "artifacts"), ("actions", "cache")])]);

        let report = reconciler(&store).apply(&pages).unwrap();

        assert_eq!(report.created, vec!["actions/artifacts", "actions/cache", "meta"]);
        assert_eq!(report.created_dirs, vec!["actions"]);
        assert_eq!(store.page_paths(), vec!["actions/artifacts", "actions/cache", "meta"]);
        assert_eq!(children(&store.index("").unwrap()), vec!["/actions", "/meta"]);
        assert_eq!(
            children(&store.index("actions").unwrap()),
            vec!["/artifacts", "/cache"]
        );
    }

    #[test]
    fn test_directory_introduction_order() {
        let store = Arc::new(MockPageStore::new().with_index("", index_with(&[])));
        let pages = desired(&[("fpt", &[("actions", "artifacts"), ("actions", "cache")])]);

        reconciler(&store).apply(&pages).unwrap();

        assert_eq!(
            store.mutations(),
            vec![
                Mutation::CreateDir("actions".to_owned()),
                Mutation::WriteIndex(String::new()),
                Mutation::WritePage("actions/artifacts".to_owned()),
                Mutation::WriteIndex("actions".to_owned()),
                Mutation::WritePage("actions/cache".to_owned()),
                Mutation::WriteIndex("actions".to_owned()),
            ]
        );
        let index = store.index("actions").unwrap();
        assert_eq!(index.frontmatter.title.as_deref(), Some("actions"));
        assert!(index.frontmatter.is_autogenerated("rest"));
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let store = Arc::new(MockPageStore::new().with_index("", index_with(&[])));
        let pages = desired(&[
            ("fpt", &[("meta", "meta"), ("actions", "artifacts"), ("actions", "cache")]),
            ("ghes-3.4", &[("actions", "artifacts")]),
        ]);
        let reconciler = reconciler(&store);

        assert!(!reconciler.apply(&pages).unwrap().is_empty());
        store.clear_mutations();

        assert!(reconciler.plan(&pages).unwrap().is_empty());
        let report = reconciler.apply(&pages).unwrap();
        assert!(report.is_empty());
        assert!(store.mutations().is_empty());
    }

    #[test]
    fn test_round_trip_keeps_versions() {
        let registry = registry();
        let catalog = catalog(
            &registry,
            &[
                ("api.github.com", &[("actions", "artifacts")]),
                ("ghes-3.3", &[("actions", "artifacts")]),
                ("ghes-3.5", &[("actions", "artifacts")]),
            ],
        );
        let defaults = FrontmatterDefaults::new("rest");
        let pages = project(&catalog, &registry, &defaults).unwrap();

        let temp_dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn PageStore> = Arc::new(FsPageStore::new(temp_dir.path()));
        Reconciler::new(Arc::clone(&store), defaults.clone())
            .apply(&pages)
            .unwrap();

        let reread = store.read("actions").unwrap();
        let reprojected = project(&catalog, &registry, &defaults).unwrap();
        assert_eq!(reread.frontmatter.versions, reprojected.get("actions").unwrap().versions);
        assert_eq!(reread.frontmatter.versions["ghes"], "=3.3 || =3.5");
    }

    #[test]
    fn test_update_preserves_hand_edits() {
        let mut existing = generated("artifacts", &[("fpt", "*")]);
        existing.frontmatter.title = Some("Artifacts".to_owned());
        existing.frontmatter.intro = Some("Use the REST API to manage artifacts.".to_owned());
        existing.body = "\n## Extra notes\n".to_owned();
        let store = Arc::new(
            MockPageStore::new()
                .with_index("", index_with(&["/actions"]))
                .with_index("actions", index_with(&["/artifacts"]))
                .with_page("actions/artifacts", existing.clone())
                .with_page("actions/cache", generated("cache", &[("fpt", "*")])),
        );
        let pages = desired(&[
            ("fpt", &[("actions", "artifacts"), ("actions", "cache")]),
            ("ghes-3.5", &[("actions", "artifacts")]),
        ]);

        let report = reconciler(&store).apply(&pages).unwrap();

        assert_eq!(report.updated, vec!["actions/artifacts"]);
        assert!(report.created.is_empty());
        let page = store.page("actions/artifacts").unwrap();
        assert_eq!(page.frontmatter.title, existing.frontmatter.title);
        assert_eq!(page.frontmatter.intro, existing.frontmatter.intro);
        assert_eq!(page.body, existing.body);
        assert_eq!(page.frontmatter.versions["ghes"], ">=3.5");
        assert_eq!(
            store.mutations(),
            vec![Mutation::WritePage("actions/artifacts".to_owned())]
        );
    }

    #[test]
    fn test_removes_stale_generated_pages_only() {
        let mut manual = generated("guide", &[]);
        manual.frontmatter.autogenerated = None;
        let store = Arc::new(
            MockPageStore::new()
                .with_index("", index_with(&["/meta", "/old", "/guide"]))
                .with_page("meta", generated("meta", &[("fpt", "*")]))
                .with_page("old", generated("old", &[("fpt", "*")]))
                .with_page("guide", manual),
        );
        let pages = desired(&[("fpt", &[("meta", "meta")])]);

        let report = reconciler(&store).apply(&pages).unwrap();

        assert_eq!(report.removed, vec!["old"]);
        assert_eq!(store.page_paths(), vec!["guide", "meta"]);
        assert_eq!(children(&store.index("").unwrap()), vec!["/meta", "/guide"]);
    }

    #[test]
    fn test_directory_collapse() {
        let store = Arc::new(
            MockPageStore::new()
                .with_index("", index_with(&["/actions", "/meta"]))
                .with_index("actions", index_with(&["/artifacts"]))
                .with_page("actions/artifacts", generated("artifacts", &[("fpt", "*")]))
                .with_page("meta", generated("meta", &[("fpt", "*")])),
        );
        let pages = desired(&[("fpt", &[("meta", "meta")])]);

        let report = reconciler(&store).apply(&pages).unwrap();

        assert_eq!(report.removed, vec!["actions/artifacts"]);
        assert_eq!(report.removed_dirs, vec!["actions"]);
        assert!(!store.dir_exists("actions"));
        assert!(store.index("actions").is_none());
        assert_eq!(children(&store.index("").unwrap()), vec!["/meta"]);
        assert_eq!(
            store.mutations(),
            vec![
                Mutation::DeletePage("actions/artifacts".to_owned()),
                Mutation::RemoveDir("actions".to_owned()),
                Mutation::WriteIndex(String::new()),
            ]
        );
    }

    #[test]
    fn test_directory_collapse_with_hidden_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn PageStore> = Arc::new(FsPageStore::new(temp_dir.path()));
        let reconciler = Reconciler::new(Arc::clone(&store), FrontmatterDefaults::new("rest"));
        reconciler
            .apply(&desired(&[(
                "fpt",
                &[("meta", "meta"), ("actions", "artifacts"), ("actions", "cache")],
            )]))
            .unwrap();
        std::fs::write(temp_dir.path().join("actions/.gitkeep"), "").unwrap();

        let report = reconciler
            .apply(&desired(&[("fpt", &[("meta", "meta")])]))
            .unwrap();

        assert_eq!(report.removed, vec!["actions/artifacts", "actions/cache"]);
        assert_eq!(report.removed_dirs, vec!["actions"]);
        assert!(!temp_dir.path().join("actions").exists());
        assert_eq!(
            children(&store.read_index("").unwrap().unwrap()),
            vec!["/meta"]
        );
    }

    #[test]
    fn test_partial_removal_keeps_directory() {
        let store = Arc::new(
            MockPageStore::new()
                .with_index("", index_with(&["/actions"]))
                .with_index("actions", index_with(&["/artifacts", "/cache", "/runners"]))
                .with_page("actions/artifacts", generated("artifacts", &[("fpt", "*")]))
                .with_page("actions/cache", generated("cache", &[("fpt", "*")]))
                .with_page("actions/runners", generated("runners", &[("fpt", "*")])),
        );
        let pages = desired(&[("fpt", &[("actions", "artifacts"), ("actions", "runners")])]);

        let report = reconciler(&store).apply(&pages).unwrap();

        assert_eq!(report.removed, vec!["actions/cache"]);
        assert!(report.removed_dirs.is_empty());
        assert_eq!(
            children(&store.index("actions").unwrap()),
            vec!["/artifacts", "/runners"]
        );
    }

    #[test]
    fn test_category_becomes_single_page() {
        let store = Arc::new(
            MockPageStore::new()
                .with_index("", index_with(&["/actions"]))
                .with_index("actions", index_with(&["/artifacts", "/cache"]))
                .with_page("actions/artifacts", generated("artifacts", &[("fpt", "*")]))
                .with_page("actions/cache", generated("cache", &[("fpt", "*")])),
        );
        let pages = desired(&[("fpt", &[("actions", "artifacts")])]);

        let report = reconciler(&store).apply(&pages).unwrap();

        assert_eq!(report.removed, vec!["actions/artifacts", "actions/cache"]);
        assert_eq!(report.removed_dirs, vec!["actions"]);
        assert_eq!(report.created, vec!["actions"]);
        assert_eq!(store.page_paths(), vec!["actions"]);
        assert!(!store.dir_exists("actions"));
        assert_eq!(children(&store.index("").unwrap()), vec!["/actions"]);
    }

    #[test]
    fn test_single_page_becomes_category() {
        let store = Arc::new(
            MockPageStore::new()
                .with_index("", index_with(&["/actions"]))
                .with_page("actions", generated("actions", &[("fpt", "*")])),
        );
        let pages = desired(&[("fpt", &[("actions", "artifacts"), ("actions", "cache")])]);

        let report = reconciler(&store).apply(&pages).unwrap();

        assert_eq!(report.removed, vec!["actions"]);
        assert_eq!(report.created_dirs, vec!["actions"]);
        assert_eq!(store.page_paths(), vec!["actions/artifacts", "actions/cache"]);
        assert_eq!(children(&store.index("").unwrap()), vec!["/actions"]);
        assert_eq!(
            children(&store.index("actions").unwrap()),
            vec!["/artifacts", "/cache"]
        );
    }

    #[test]
    fn test_plan_classifies_pages() {
        let store = Arc::new(
            MockPageStore::new()
                .with_page("meta", generated("meta", &[("fpt", "*")]))
                .with_page("emojis", generated("emojis", &[("ghes", "*")]))
                .with_page("old", generated("old", &[("fpt", "*")])),
        );
        let pages = desired(&[
            ("fpt", &[("meta", "meta"), ("emojis", "emojis"), ("gists", "gists")]),
        ]);

        let plan = reconciler(&store).plan(&pages).unwrap();

        assert_eq!(
            plan,
            SyncPlan {
                create: vec!["gists".to_owned()],
                update: vec!["emojis".to_owned()],
                unchanged: vec!["meta".to_owned()],
                remove: vec!["old".to_owned()],
            }
        );
        assert!(store.mutations().is_empty());
    }

    #[test]
    fn test_versions_keys_are_sorted_on_disk() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn PageStore> = Arc::new(FsPageStore::new(temp_dir.path()));
        let pages = desired(&[
            ("ghes-3.3", &[("meta", "meta")]),
            ("fpt", &[("meta", "meta")]),
        ]);

        Reconciler::new(store, FrontmatterDefaults::new("rest"))
            .apply(&pages)
            .unwrap();

        let content = std::fs::read_to_string(temp_dir.path().join("meta.md")).unwrap();
        let fpt = content.find("fpt:").unwrap();
        let ghes = content.find("ghes:").unwrap();
        assert!(fpt < ghes);
        assert!(temp_dir.path().join("index.md").is_file());
    }
}
