//! `apidocs sync` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use apidocs_catalog::SchemaSource;
use apidocs_config::{CliSettings, Config};
use apidocs_storage::{FsPageStore, PageStore};
use apidocs_sync::{FrontmatterDefaults, Reconciler, SyncPlan, SyncReport, project};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the sync command.
#[derive(Args)]
pub(crate) struct SyncArgs {
    /// Path to configuration file (default: auto-discover apidocs.toml).
    #[arg(short, long, env = "APIDOCS_CONFIG")]
    config: Option<PathBuf>,

    /// Page tree root (overrides config).
    #[arg(long)]
    content_dir: Option<PathBuf>,

    /// Schema directory (overrides config).
    #[arg(long)]
    schema_dir: Option<PathBuf>,

    /// Show the changes without writing anything.
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl SyncArgs {
    /// Execute the sync command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, schema loading or reconciliation
    /// fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            content_dir: self.content_dir,
            schema_dir: self.schema_dir,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let registry = config.registry()?;

        let source = SchemaSource::new(
            &config.schemas_resolved.dir,
            config.schemas_resolved.filename.clone(),
        );
        output.info(&format!("Loading schemas from {}...", source.dir().display()));
        let catalog = source.load(&registry)?;

        let defaults = config.frontmatter.defaults.iter().fold(
            FrontmatterDefaults::new(config.frontmatter.autogenerated.clone()),
            |defaults, (key, value)| defaults.with_field(key.clone(), value.clone()),
        );
        let desired = project(&catalog, &registry, &defaults)?;

        let content_dir = &config.docs_resolved.content_dir;
        if !self.dry_run {
            std::fs::create_dir_all(content_dir)?;
        }
        let store: Arc<dyn PageStore> = Arc::new(FsPageStore::new(content_dir));
        let reconciler = Reconciler::new(store, defaults);

        if self.dry_run {
            let plan = if content_dir.is_dir() {
                reconciler.plan(&desired)?
            } else {
                SyncPlan {
                    create: desired.paths().map(str::to_owned).collect(),
                    ..SyncPlan::default()
                }
            };
            print_plan(&output, &plan);
        } else {
            let report = reconciler.apply(&desired)?;
            print_report(&output, &report, desired.len());
        }

        Ok(())
    }
}

fn print_list(output: &Output, label: &str, paths: &[String]) {
    if paths.is_empty() {
        return;
    }
    output.info(&format!("\n{label} ({}):", paths.len()));
    for path in paths {
        output.info(&format!("  -> {path}"));
    }
}

fn print_plan(output: &Output, plan: &SyncPlan) {
    output.highlight("\n[DRY RUN] No changes made.");

    if plan.is_empty() {
        output.success("\nPage tree is up to date.");
        return;
    }

    print_list(output, "Pages to create", &plan.create);
    print_list(output, "Pages to update", &plan.update);
    print_list(output, "Pages to remove", &plan.remove);
    output.muted(&format!("\nUnchanged pages: {}", plan.unchanged.len()));
}

fn print_report(output: &Output, report: &SyncReport, total: usize) {
    if report.is_empty() {
        output.success(&format!("\nPage tree is up to date ({total} pages)."));
        return;
    }

    output.success("\nPage tree synchronized!");
    print_list(output, "Created", &report.created);
    print_list(output, "Updated", &report.updated);
    print_list(output, "Removed", &report.removed);

    if !report.removed_dirs.is_empty() {
        output.warning(&format!(
            "\nRemoved {} empty director{}: {}",
            report.removed_dirs.len(),
            if report.removed_dirs.len() == 1 { "y" } else { "ies" },
            report.removed_dirs.join(", ")
        ));
    }
}
