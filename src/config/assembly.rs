//! Turning loaded patch sets into one catalog.
//!
//! - The built-in simple-view catalog comes first unless every applicable
//!   set opts out with `builtin = false`
//! - Built-in options come from the first applicable set that tunes them
//! - Sets whose `version_range` excludes the upstream version contribute
//!   nothing and are reported as skipped

use crate::config::schema::PatchSetConfig;
use crate::config::version::{matches_requirement, VersionError};
use crate::patch::{simple_view, PatchCatalog, SimpleViewOptions};
use crate::transform::SpecError;
use serde::Serialize;
use std::fmt;

/// A patch set left out by version gating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSet {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct Assembly {
    pub catalog: PatchCatalog,
    /// Whether the built-in catalog is part of `catalog`
    pub builtin: bool,
    pub skipped: Vec<SkippedSet>,
}

#[derive(Debug)]
pub enum AssemblyError {
    Version {
        set: String,
        source: VersionError,
    },
    /// A patch that validated alone conflicts with the rest of the catalog
    Catalog {
        set: Option<String>,
        source: SpecError,
    },
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyError::Version { set, source } => {
                write!(f, "patch set '{set}': {source}")
            }
            AssemblyError::Catalog { set, source } => match set {
                Some(set) => write!(f, "patch set '{set}': {source}"),
                None => write!(f, "built-in catalog: {source}"),
            },
        }
    }
}

impl std::error::Error for AssemblyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssemblyError::Version { source, .. } => Some(source),
            AssemblyError::Catalog { source, .. } => Some(source),
        }
    }
}

/// Assemble the catalog for `upstream_version`.
///
/// Without an upstream version, every set applies.
pub fn assemble(
    sets: &[PatchSetConfig],
    upstream_version: Option<&str>,
) -> Result<Assembly, AssemblyError> {
    let mut skipped = Vec::new();
    let mut applicable = Vec::new();

    for set in sets {
        let name = set_name(set);
        let Some(version) = upstream_version else {
            applicable.push(set);
            continue;
        };
        let range = set.meta.version_range.as_deref();
        let matched =
            matches_requirement(version, range).map_err(|source| AssemblyError::Version {
                set: name.clone(),
                source,
            })?;
        if matched {
            applicable.push(set);
        } else {
            let reason = format!(
                "upstream version {version} does not satisfy version_range {}",
                range.unwrap_or_default().trim()
            );
            tracing::info!(set = %name, %reason, "patch set skipped");
            skipped.push(SkippedSet { name, reason });
        }
    }

    let builtin = applicable.is_empty() || applicable.iter().any(|set| set.settings.builtin);
    let mut catalog = PatchCatalog::new();

    if builtin {
        let options = applicable
            .iter()
            .find(|set| set.settings.builtin && set.settings.tunes_builtin())
            .map(|set| set.settings.options())
            .unwrap_or_else(SimpleViewOptions::default);
        catalog = simple_view::catalog(&options)
            .map_err(|source| AssemblyError::Catalog { set: None, source })?;
    }

    for set in applicable {
        for definition in &set.patches {
            definition
                .to_named_patch()
                .and_then(|patch| catalog.push(patch))
                .map_err(|source| AssemblyError::Catalog {
                    set: Some(set_name(set)),
                    source,
                })?;
        }
    }

    Ok(Assembly {
        catalog,
        builtin,
        skipped,
    })
}

fn set_name(set: &PatchSetConfig) -> String {
    if set.meta.name.is_empty() {
        "(unnamed)".to_string()
    } else {
        set.meta.name.clone()
    }
}
