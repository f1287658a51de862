use crate::patch::{CssNewline, NamedPatch, SimpleViewOptions};
use crate::transform::{MatchSpec, Replacement, Scope, SpecError, Transform};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

/// One TOML patch set.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct PatchSetConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub patches: Vec<PatchDefinition>,
}

impl PatchSetConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.patches.is_empty() && !self.settings.builtin {
            issues.push(ValidationIssue::EmptyPatchList);
        }

        if !self.settings.builtin && self.settings.tunes_builtin() {
            issues.push(ValidationIssue::InvalidCombo {
                patch_id: None,
                message: "settings tune the built-in catalog but builtin = false".to_string(),
            });
        }
        if matches!(&self.settings.allowed_tabs, Some(tabs) if tabs.is_empty()) {
            issues.push(ValidationIssue::InvalidCombo {
                patch_id: None,
                message: "allowed_tabs is empty; every tab would be dropped".to_string(),
            });
        }
        if matches!(&self.settings.host_object, Some(host) if host.trim().is_empty()) {
            issues.push(ValidationIssue::MissingField {
                patch_id: None,
                field: "settings.host_object",
            });
        }

        let mut seen = HashSet::new();
        for patch in &self.patches {
            if patch.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    patch_id: None,
                    field: "id",
                });
            } else if !seen.insert(patch.id.as_str()) {
                issues.push(ValidationIssue::DuplicateId {
                    patch_id: patch.id.clone(),
                });
            }
            if patch.file.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    patch_id: Some(patch.id.clone()),
                    field: "file",
                });
            }

            match &patch.query {
                Query::Text { search, .. } => {
                    if search.is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            patch_id: Some(patch.id.clone()),
                            field: "query.search",
                        });
                        continue;
                    }
                }
                Query::Regex { pattern, .. } => {
                    if pattern.trim().is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            patch_id: Some(patch.id.clone()),
                            field: "query.pattern",
                        });
                        continue;
                    }
                }
            }

            if let Operation::Template { text } = &patch.operation {
                if text.is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        patch_id: Some(patch.id.clone()),
                        field: "operation.text",
                    });
                    continue;
                }
            }

            if let Err(source) = patch.transform() {
                issues.push(ValidationIssue::InvalidPatch {
                    patch_id: patch.id.clone(),
                    source,
                });
            } else if patch.markers.is_empty() && patch.default_marker().is_none() {
                issues.push(ValidationIssue::InvalidCombo {
                    patch_id: Some(patch.id.clone()),
                    message: "operation leaves no fixed text behind; set markers to detect a re-run"
                        .to_string(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Semver requirement on the upstream DevTools version
    #[serde(default)]
    pub version_range: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Include the built-in simple-view catalog
    #[serde(default = "default_builtin")]
    pub builtin: bool,
    #[serde(default)]
    pub allowed_tabs: Option<Vec<String>>,
    #[serde(default)]
    pub css_newline: Option<CssNewline>,
    #[serde(default)]
    pub host_object: Option<String>,
}

fn default_builtin() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            builtin: true,
            allowed_tabs: None,
            css_newline: None,
            host_object: None,
        }
    }
}

impl Settings {
    /// Any built-in option set explicitly.
    pub fn tunes_builtin(&self) -> bool {
        self.allowed_tabs.is_some() || self.css_newline.is_some() || self.host_object.is_some()
    }

    /// Built-in catalog options with these settings laid over the defaults.
    pub fn options(&self) -> SimpleViewOptions {
        let defaults = SimpleViewOptions::default();
        SimpleViewOptions {
            allowed_tabs: self.allowed_tabs.clone().unwrap_or(defaults.allowed_tabs),
            css_newline: self.css_newline.unwrap_or(defaults.css_newline),
            host_object: self.host_object.clone().unwrap_or(defaults.host_object),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PatchDefinition {
    pub id: String,
    /// Path relative to the DevTools root, `/`-separated
    pub file: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requires: Vec<String>,
    /// Fragments proving the patch already took effect
    #[serde(default)]
    pub markers: Vec<String>,
    pub query: Query,
    pub operation: Operation,
}

impl PatchDefinition {
    /// Compile the query/operation pair.
    pub fn transform(&self) -> Result<Transform, SpecError> {
        let (spec, scope) = match &self.query {
            Query::Text { search, scope } => (MatchSpec::literal(search.as_str())?, *scope),
            Query::Regex { pattern, scope } => (MatchSpec::pattern(pattern)?, *scope),
        };
        let replacement = match &self.operation {
            Operation::Replace { text } => Replacement::Literal(text.clone()),
            Operation::Template { text } => Replacement::Template(text.clone()),
            Operation::InsertBefore { text } => Replacement::insert_before(text),
            Operation::InsertAfter { text } => Replacement::insert_after(text),
            Operation::Delete => Replacement::delete(),
        };
        Transform::new(spec, replacement, scope.into())
    }

    /// Fixed text the operation leaves in the output.
    ///
    /// Inserts after a text query include the anchor, so the marker is the
    /// whole rendered site rather than the bare inserted fragment.
    pub fn default_marker(&self) -> Option<String> {
        let anchor = match &self.query {
            Query::Text { search, .. } => Some(search.as_str()),
            Query::Regex { .. } => None,
        };
        let marker = match (&self.operation, anchor) {
            (Operation::Replace { text }, _) => text.clone(),
            (Operation::InsertBefore { text }, Some(anchor)) => format!("{text}{anchor}"),
            (Operation::InsertAfter { text }, Some(anchor)) => format!("{anchor}{text}"),
            (Operation::InsertBefore { text } | Operation::InsertAfter { text }, None) => {
                text.clone()
            }
            (Operation::Template { text }, _) => Replacement::Template(text.clone()).static_text(),
            (Operation::Delete, _) => String::new(),
        };
        (!marker.trim().is_empty()).then_some(marker)
    }

    /// Build the named patch.
    ///
    /// Without explicit markers, [`PatchDefinition::default_marker`] is used.
    pub fn to_named_patch(&self) -> Result<NamedPatch, SpecError> {
        let mut patch = NamedPatch::new(self.id.as_str(), self.file.as_str())
            .describe(self.description.clone().unwrap_or_default())
            .step(self.transform()?);

        let markers = if self.markers.is_empty() {
            self.default_marker().into_iter().collect()
        } else {
            self.markers.clone()
        };
        for marker in markers {
            patch = patch.marker(marker);
        }
        for required in &self.requires {
            patch = patch.requires(required.as_str());
        }
        Ok(patch)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Query {
    /// Exact string match
    Text {
        search: String,
        #[serde(default)]
        scope: QueryScope,
    },
    Regex {
        pattern: String,
        #[serde(default)]
        scope: QueryScope,
    },
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum QueryScope {
    #[default]
    First,
    All,
}

impl From<QueryScope> for Scope {
    fn from(scope: QueryScope) -> Self {
        match scope {
            QueryScope::First => Scope::First,
            QueryScope::All => Scope::All,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Operation {
    Replace { text: String },
    /// Replacement with `$N` / `${name}` capture references
    Template { text: String },
    InsertBefore { text: String },
    InsertAfter { text: String },
    Delete,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptyPatchList,
    MissingField {
        patch_id: Option<String>,
        field: &'static str,
    },
    DuplicateId {
        patch_id: String,
    },
    InvalidCombo {
        patch_id: Option<String>,
        message: String,
    },
    /// Query/operation pair rejected by the transform layer
    InvalidPatch {
        patch_id: String,
        source: SpecError,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyPatchList => {
                write!(f, "patch set has no patches and disables the built-in catalog")
            }
            ValidationIssue::MissingField { patch_id, field } => match patch_id {
                Some(id) => write!(f, "patch '{id}' missing required field '{field}'"),
                None => write!(f, "missing required field '{field}'"),
            },
            ValidationIssue::DuplicateId { patch_id } => {
                write!(f, "patch id '{patch_id}' is defined more than once")
            }
            ValidationIssue::InvalidCombo { patch_id, message } => match patch_id {
                Some(id) => write!(f, "patch '{id}' has invalid configuration: {message}"),
                None => write!(f, "invalid patch set configuration: {message}"),
            },
            ValidationIssue::InvalidPatch { patch_id, source } => {
                write!(f, "patch '{patch_id}': {source}")
            }
        }
    }
}
