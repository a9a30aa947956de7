//! Defensive decoding of `ai-generated/specification.yaml`.
//!
//! Project specifications are written by earlier pipeline stages and are
//! loosely typed in practice: keys go missing, lists arrive as scalars,
//! feature entries mix bare strings with `{name: ...}` mappings. The loader
//! therefore never fails on field shape. [`decode`] is a total function from
//! any YAML document to a [`ProjectSpec`]; only an absent, unreadable, or
//! unparsable file is an error, and those three are distinct from every
//! "ran but produced nothing usable" failure downstream.

use std::io;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

pub const DEFAULT_NAME: &str = "Unknown Project";
pub const DEFAULT_KIND: &str = "application";
pub const DEFAULT_DESCRIPTION: &str = "No description provided";
pub const DEFAULT_BUSINESS_MODEL: &str = "Not specified";

/// Label rendered for a `{...}` feature entry that has no usable `name`.
const FEATURE_PLACEHOLDER: &str = "Feature";

// ─── Types ────────────────────────────────────────────────────────────────────

/// One entry of `features.core`, preserving the raw entry's shape.
///
/// Every raw entry becomes exactly one `Feature`, so the feature *count*
/// always matches the document even when individual entries are junk.
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    /// A bare string entry.
    Plain(String),
    /// A mapping entry; `None` when it carries no string `name` key.
    Named(Option<String>),
    /// Any other YAML shape (number, null, nested list). Counted, never
    /// listed in prompts.
    Opaque,
}

impl Feature {
    /// Bullet-point label for prompts, or `None` for entries that cannot be
    /// rendered.
    pub fn label(&self) -> Option<&str> {
        match self {
            Feature::Plain(s) => Some(s),
            Feature::Named(Some(name)) => Some(name),
            Feature::Named(None) => Some(FEATURE_PLACEHOLDER),
            Feature::Opaque => None,
        }
    }
}

/// Normalized project specification with a documented default for every
/// optional field.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSpec {
    /// `project.name`, default `"Unknown Project"`.
    pub name: String,
    /// `project.type`, default `"application"`.
    pub kind: String,
    /// `project.description`, default `"No description provided"`.
    pub description: String,
    /// `features.core`, default empty.
    pub core_features: Vec<Feature>,
    /// `technical.stack`, default empty; non-string entries are dropped.
    pub tech_stack: Vec<String>,
    /// `business.model.type`, default `"Not specified"`.
    pub business_model: String,
}

/// Loading a specification file failed.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("no specification at {}", path.display())]
    NotFound { path: PathBuf },
    #[error("could not read specification: {source}")]
    Unreadable {
        #[source]
        source: io::Error,
    },
    #[error("specification is not valid YAML: {source}")]
    Invalid {
        #[source]
        source: serde_yaml::Error,
    },
}

// ─── Decoding ─────────────────────────────────────────────────────────────────

/// Decode any YAML document into a [`ProjectSpec`].
///
/// Total: wrong-typed or absent fields coerce to their defaults, never to an
/// error. A non-mapping document decodes to the all-defaults record.
pub fn decode(doc: &Value) -> ProjectSpec {
    let project = doc.get("project");

    let core_features = doc
        .get("features")
        .and_then(|f| f.get("core"))
        .and_then(Value::as_sequence)
        .map(|entries| entries.iter().map(decode_feature).collect())
        .unwrap_or_default();

    let tech_stack = doc
        .get("technical")
        .and_then(|t| t.get("stack"))
        .and_then(Value::as_sequence)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    let business_model = doc
        .get("business")
        .and_then(|b| b.get("model"))
        .filter(|m| m.is_mapping())
        .and_then(|m| m.get("type"))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_BUSINESS_MODEL)
        .to_owned();

    ProjectSpec {
        name: str_field(project, "name", DEFAULT_NAME),
        kind: str_field(project, "type", DEFAULT_KIND),
        description: str_field(project, "description", DEFAULT_DESCRIPTION),
        core_features,
        tech_stack,
        business_model,
    }
}

fn str_field(parent: Option<&Value>, key: &str, default: &str) -> String {
    parent
        .and_then(|p| p.get(key))
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_owned()
}

fn decode_feature(entry: &Value) -> Feature {
    if let Some(s) = entry.as_str() {
        Feature::Plain(s.to_owned())
    } else if entry.is_mapping() {
        Feature::Named(
            entry
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_owned),
        )
    } else {
        Feature::Opaque
    }
}

/// Read and decode the specification at `path`.
pub fn load_spec(path: &Path) -> Result<ProjectSpec, SpecError> {
    let text = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            SpecError::NotFound {
                path: path.to_owned(),
            }
        } else {
            SpecError::Unreadable { source }
        }
    })?;
    let doc: Value =
        serde_yaml::from_str(&text).map_err(|source| SpecError::Invalid { source })?;
    Ok(decode(&doc))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
