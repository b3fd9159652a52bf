//! Configuration management for apidocs.
//!
//! Parses `apidocs.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! Path configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `docs.content_dir`
//! - `schemas.dir`
//! - `schemas.filename`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use apidocs_versions::{Registry, ReleaseLine};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override page tree root.
    pub content_dir: Option<PathBuf>,
    /// Override schema directory.
    pub schema_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "apidocs.toml";

const DEFAULT_CONTENT_DIR: &str = "content/rest";
const DEFAULT_SCHEMA_DIR: &str = "schemas";
const DEFAULT_SCHEMA_FILENAME: &str = "schema.json";
const DEFAULT_MARKER: &str = "rest";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page tree configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Schema source configuration (paths are relative strings from TOML).
    schemas: SchemasConfigRaw,
    /// Generated frontmatter configuration.
    pub frontmatter: FrontmatterConfig,
    /// Known release lines.
    pub release_lines: Vec<ReleaseLine>,

    /// Resolved page tree configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Resolved schema configuration (set after loading).
    #[serde(skip)]
    pub schemas_resolved: SchemasConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw page tree configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    content_dir: Option<String>,
}

/// Resolved page tree configuration.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Root of the documentation page tree.
    pub content_dir: PathBuf,
}

/// Raw schema configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SchemasConfigRaw {
    dir: Option<String>,
    filename: Option<String>,
}

/// Resolved schema configuration.
#[derive(Debug, Default)]
pub struct SchemasConfig {
    /// Directory holding one sub-directory per version.
    pub dir: PathBuf,
    /// Schema file name inside each version directory.
    pub filename: String,
}

/// Generated frontmatter configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FrontmatterConfig {
    /// Marker stored in the `autogenerated` key.
    pub autogenerated: String,
    /// Extra keys written to every generated page.
    pub defaults: BTreeMap<String, serde_yaml::Value>,
}

impl Default for FrontmatterConfig {
    fn default() -> Self {
        Self {
            autogenerated: DEFAULT_MARKER.to_owned(),
            defaults: BTreeMap::new(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`schemas.dir`").
        field: String,
        /// Error message (e.g., "${`SCHEMA_DIR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a string field to be a plain file name.
fn require_file_name(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(ConfigError::Validation(format!(
            "{field} must be a file name, not a path"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `apidocs.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(content_dir) = &settings.content_dir {
            self.docs_resolved.content_dir.clone_from(content_dir);
        }
        if let Some(schema_dir) = &settings.schema_dir {
            self.schemas_resolved.dir.clone_from(schema_dir);
        }
    }

    /// Build the release line registry.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if no release lines are configured or
    /// the lines are inconsistent.
    pub fn registry(&self) -> Result<Registry, ConfigError> {
        if self.release_lines.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[release_lines]] entry is required".to_owned(),
            ));
        }
        Registry::new(self.release_lines.iter().cloned())
            .map_err(|e| ConfigError::Validation(format!("release_lines: {e}")))
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            docs: DocsConfigRaw::default(),
            schemas: SchemasConfigRaw::default(),
            frontmatter: FrontmatterConfig::default(),
            release_lines: Vec::new(),
            docs_resolved: DocsConfig {
                content_dir: base.join(DEFAULT_CONTENT_DIR),
            },
            schemas_resolved: SchemasConfig {
                dir: base.join(DEFAULT_SCHEMA_DIR),
                filename: DEFAULT_SCHEMA_FILENAME.to_owned(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading and resolution
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.schemas_resolved.filename, "schemas.filename")?;
        require_file_name(&self.schemas_resolved.filename, "schemas.filename")?;
        require_non_empty(&self.frontmatter.autogenerated, "frontmatter.autogenerated")?;
        self.registry()?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.docs.content_dir {
            self.docs.content_dir = Some(expand::expand_env(dir, "docs.content_dir")?);
        }
        if let Some(ref dir) = self.schemas.dir {
            self.schemas.dir = Some(expand::expand_env(dir, "schemas.dir")?);
        }
        if let Some(ref filename) = self.schemas.filename {
            self.schemas.filename = Some(expand::expand_env(filename, "schemas.filename")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.docs_resolved = DocsConfig {
            content_dir: resolve(self.docs.content_dir.as_deref(), DEFAULT_CONTENT_DIR),
        };
        self.schemas_resolved = SchemasConfig {
            dir: resolve(self.schemas.dir.as_deref(), DEFAULT_SCHEMA_DIR),
            filename: self
                .schemas
                .filename
                .clone()
                .unwrap_or_else(|| DEFAULT_SCHEMA_FILENAME.to_owned()),
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const FULL: &str = r#"
[docs]
content_dir = "content/rest"

[schemas]
dir = "lib/rest/static/decorated"
filename = "schema.json"

[frontmatter]
autogenerated = "rest"

[frontmatter.defaults]
topics = ["API"]
miniTocMaxHeadingLevel = 3

[[release_lines]]
id = "fpt"
aliases = ["api.github.com"]

[[release_lines]]
id = "ghes"
numbered = true
releases = ["3.3", "3.4", "3.5"]
current = "3.5"
"#;

    fn with_lines(toml: &str) -> String {
        format!("{toml}\n[[release_lines]]\nid = \"fpt\"\n")
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(
            config.docs_resolved.content_dir,
            PathBuf::from("/test/content/rest")
        );
        assert_eq!(config.schemas_resolved.dir, PathBuf::from("/test/schemas"));
        assert_eq!(config.schemas_resolved.filename, "schema.json");
        assert_eq!(config.frontmatter.autogenerated, "rest");
        assert!(config.frontmatter.defaults.is_empty());
        assert!(config.release_lines.is_empty());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.frontmatter.autogenerated, "rest");
        assert!(config.release_lines.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(FULL).unwrap();

        assert_eq!(config.release_lines.len(), 2);
        assert_eq!(config.release_lines[0].aliases, vec!["api.github.com"]);
        assert!(config.release_lines[1].numbered);
        assert_eq!(config.release_lines[1].current.as_deref(), Some("3.5"));

        let defaults = &config.frontmatter.defaults;
        assert_eq!(defaults["miniTocMaxHeadingLevel"].as_u64(), Some(3));
        assert_eq!(
            defaults["topics"].as_sequence().map(Vec::len),
            Some(1)
        );
    }

    #[test]
    fn test_registry_from_release_lines() {
        let config: Config = toml::from_str(FULL).unwrap();
        let registry = config.registry().unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve("api.github.com").unwrap().line(), "fpt");
        assert_eq!(
            registry.resolve("ghes-3.4").unwrap().release(),
            Some("3.4")
        );
    }

    #[test]
    fn test_registry_requires_release_lines() {
        let config = Config::default_with_base(Path::new("/test"));
        let err = config.registry().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("release_lines"));
    }

    #[test]
    fn test_registry_rejects_inconsistent_lines() {
        let toml = r#"
[[release_lines]]
id = "ghes"
numbered = true
releases = ["3.3", "3.4"]
current = "3.9"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.registry().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_resolve_paths() {
        let mut config: Config = toml::from_str(FULL).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.docs_resolved.content_dir,
            PathBuf::from("/project/content/rest")
        );
        assert_eq!(
            config.schemas_resolved.dir,
            PathBuf::from("/project/lib/rest/static/decorated")
        );
        assert_eq!(config.schemas_resolved.filename, "schema.json");
    }

    #[test]
    fn test_resolve_paths_defaults() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.docs_resolved.content_dir,
            PathBuf::from("/project/content/rest")
        );
        assert_eq!(config.schemas_resolved.dir, PathBuf::from("/project/schemas"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            content_dir: Some(PathBuf::from("/custom/content")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(
            config.docs_resolved.content_dir,
            PathBuf::from("/custom/content")
        );
        assert_eq!(config.schemas_resolved.dir, PathBuf::from("/test/schemas"));
    }

    #[test]
    fn test_apply_cli_settings_schema_dir() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            schema_dir: Some(PathBuf::from("/custom/schemas")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.schemas_resolved.dir, PathBuf::from("/custom/schemas"));
    }

    #[test]
    fn test_expand_env_vars_paths() {
        // SAFETY: no other test reads or writes this variable name
        unsafe {
            std::env::set_var("TEST_APIDOCS_SCHEMAS", "/data/schemas");
        }

        let toml = r#"
[schemas]
dir = "${TEST_APIDOCS_SCHEMAS}"
filename = "${TEST_APIDOCS_SCHEMA_FILE:-schema.json}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.schemas.dir.as_deref(), Some("/data/schemas"));
        assert_eq!(config.schemas.filename.as_deref(), Some("schema.json"));

        // SAFETY: no other test reads or writes this variable name
        unsafe {
            std::env::remove_var("TEST_APIDOCS_SCHEMAS");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: no other test reads or writes this variable name
        unsafe {
            std::env::remove_var("MISSING_VAR_APIDOCS_TEST");
        }

        let toml = r#"
[docs]
content_dir = "${MISSING_VAR_APIDOCS_TEST}/rest"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MISSING_VAR_APIDOCS_TEST"));
        assert!(err.to_string().contains("docs.content_dir"));
    }

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_full_config_passes() {
        let mut config: Config = toml::from_str(FULL).unwrap();
        config.resolve_paths(Path::new("/project"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_schema_filename_must_be_file_name() {
        let mut config: Config =
            toml::from_str(&with_lines("[schemas]\nfilename = \"nested/schema.json\"\n")).unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_validation_error(&config, &["schemas.filename", "file name"]);
    }

    #[test]
    fn test_validate_empty_schema_filename() {
        let mut config: Config = toml::from_str(&with_lines("[schemas]\nfilename = \"\"\n")).unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_validation_error(&config, &["schemas.filename", "cannot be empty"]);
    }

    #[test]
    fn test_validate_empty_marker() {
        let mut config: Config =
            toml::from_str(&with_lines("[frontmatter]\nautogenerated = \"\"\n")).unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_validation_error(&config, &["frontmatter.autogenerated"]);
    }

    #[test]
    fn test_load_explicit_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("apidocs.toml");
        std::fs::write(&path, FULL).unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
        assert_eq!(
            config.docs_resolved.content_dir,
            temp_dir.path().join("content/rest")
        );
    }

    #[test]
    fn test_load_applies_cli_settings() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("apidocs.toml");
        std::fs::write(&path, FULL).unwrap();
        let settings = CliSettings {
            schema_dir: Some(PathBuf::from("/override")),
            ..Default::default()
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.schemas_resolved.dir, PathBuf::from("/override"));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/apidocs.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("apidocs.toml");
        std::fs::write(&path, "[docs\ncontent_dir = 1").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
