//! Page text format.
//!
//! A page starts with a YAML frontmatter block delimited by `---` lines,
//! followed by free-form body text:
//!
//! ```text
//! ---
//! title: Artifacts
//! shortTitle: Artifacts
//! intro: ''
//! versions:
//!   fpt: '*'
//!   ghes: '>=3.5'
//! autogenerated: rest
//! ---
//! Hand-written body.
//! ```
//!
//! Known keys are typed fields of [`Frontmatter`]; every other key is kept
//! in [`Frontmatter::extra`] and written back unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Frontmatter block delimiter.
const DELIMITER: &str = "---";

/// Structured metadata at the top of a page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frontmatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,

    /// Range expression per release line, sorted by line id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub versions: BTreeMap<String, String>,

    /// Marker identifying pages owned by the generator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autogenerated: Option<String>,

    /// Child references (`/name`) of an index page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,

    /// Any other keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Frontmatter {
    /// Whether the page carries the given autogenerated marker.
    #[must_use]
    pub fn is_autogenerated(&self, marker: &str) -> bool {
        self.autogenerated.as_deref() == Some(marker)
    }
}

/// Error parsing or rendering page frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unterminated frontmatter block")]
    Unterminated,

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A page: frontmatter plus body text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub frontmatter: Frontmatter,
    pub body: String,
}

impl Page {
    #[must_use]
    pub fn new(frontmatter: Frontmatter, body: impl Into<String>) -> Self {
        Self {
            frontmatter,
            body: body.into(),
        }
    }

    /// Parse page text.
    ///
    /// Text that does not open with a `---` line has empty frontmatter and is
    /// kept entirely as body.
    ///
    /// # Errors
    ///
    /// Returns [`FrontmatterError`] if the block is not closed or its YAML is
    /// malformed.
    pub fn parse(content: &str) -> Result<Self, FrontmatterError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut lines = content.split_inclusive('\n');

        let Some(first) = lines.next().filter(|l| l.trim_end() == DELIMITER) else {
            return Ok(Self::new(Frontmatter::default(), content));
        };

        let mut offset = first.len();
        for line in lines {
            let trimmed = line.trim_end();
            if trimmed == DELIMITER || trimmed == "..." {
                let yaml = &content[first.len()..offset];
                let body = &content[offset + line.len()..];
                return Ok(Self::new(parse_yaml(yaml)?, body));
            }
            offset += line.len();
        }

        Err(FrontmatterError::Unterminated)
    }

    /// Render the page to text.
    ///
    /// # Errors
    ///
    /// Returns [`FrontmatterError`] if the frontmatter cannot be serialized.
    pub fn render(&self) -> Result<String, FrontmatterError> {
        let yaml = serde_yaml::to_string(&self.frontmatter)?;
        Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n{}", self.body))
    }
}

fn parse_yaml(yaml: &str) -> Result<Frontmatter, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(Frontmatter::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}
