//! Per-file ordered patch lists and result aggregation.

use crate::patch::{NamedPatch, PatchOutcome};
use crate::transform::SpecError;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Target file identity → ordered named patches.
#[derive(Debug, Clone, Default)]
pub struct PatchCatalog {
    files: BTreeMap<String, Vec<NamedPatch>>,
    ids: HashSet<String>,
}

/// How one named patch fared against one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum PatchStatus {
    Applied,
    AlreadyApplied,
    /// Expected fragment missing (upstream drift)
    NotApplied { reason: String },
    /// A required patch did not take effect, so this one was not attempted
    Skipped { missing: Vec<String> },
}

impl PatchStatus {
    /// The patch's behavior is present in the output.
    pub fn is_effective(&self) -> bool {
        matches!(self, PatchStatus::Applied | PatchStatus::AlreadyApplied)
    }
}

impl fmt::Display for PatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchStatus::Applied => write!(f, "applied"),
            PatchStatus::AlreadyApplied => write!(f, "already applied"),
            PatchStatus::NotApplied { reason } => write!(f, "not applied ({reason})"),
            PatchStatus::Skipped { missing } => {
                write!(f, "skipped (requires {})", missing.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchReport {
    pub id: String,
    #[serde(flatten)]
    pub status: PatchStatus,
}

/// Aggregated outcome of running a file's patch list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub file: String,
    pub changed: bool,
    pub patches: Vec<PatchReport>,
    #[serde(skip)]
    pub text: String,
}

impl FileReport {
    /// Patches that did not take effect, in list order.
    pub fn not_applied(&self) -> impl Iterator<Item = &PatchReport> {
        self.patches.iter().filter(|p| !p.status.is_effective())
    }

    /// Every patch in the list took effect.
    pub fn is_complete(&self) -> bool {
        self.not_applied().next().is_none()
    }

    pub fn status_of(&self, id: &str) -> Option<&PatchStatus> {
        self.patches.iter().find(|p| p.id == id).map(|p| &p.status)
    }
}

impl PatchCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a patch to its file's list.
    ///
    /// Ids are unique catalog-wide and dependencies must name an earlier
    /// patch of the same file; both are checked here.
    pub fn push(&mut self, patch: NamedPatch) -> Result<(), SpecError> {
        patch.validate()?;

        if self.ids.contains(patch.id()) {
            return Err(SpecError::DuplicatePatchId {
                id: patch.id().to_string(),
            });
        }

        let earlier = self.patches_for(patch.file());
        for required in patch.dependencies() {
            if !earlier.iter().any(|p| p.id() == required) {
                return Err(SpecError::UnknownDependency {
                    patch: patch.id().to_string(),
                    requires: required.clone(),
                    file: patch.file().to_string(),
                });
            }
        }

        self.ids.insert(patch.id().to_string());
        self.files
            .entry(patch.file().to_string())
            .or_default()
            .push(patch);
        Ok(())
    }

    /// Chainable form of [`PatchCatalog::push`].
    pub fn with(mut self, patch: NamedPatch) -> Result<Self, SpecError> {
        self.push(patch)?;
        Ok(self)
    }

    /// Target files, sorted.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Ordered patches for `file` (empty when the file is not targeted).
    pub fn patches_for(&self, file: &str) -> &[NamedPatch] {
        self.files.get(file).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn get(&self, id: &str) -> Option<&NamedPatch> {
        self.files.values().flatten().find(|p| p.id() == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Run `file`'s ordered list over `text`.
    ///
    /// Each patch sees the previous one's output. A patch that does not apply
    /// never stops the list; only patches that declared it as a requirement
    /// are skipped.
    pub fn apply_file(&self, file: &str, text: &str) -> Result<FileReport, SpecError> {
        let mut current = text.to_string();
        let mut patches: Vec<PatchReport> = Vec::new();

        for patch in self.patches_for(file) {
            let missing: Vec<String> = patch
                .dependencies()
                .iter()
                .filter(|required| {
                    !patches
                        .iter()
                        .any(|r| &r.id == *required && r.status.is_effective())
                })
                .cloned()
                .collect();

            let status = if !missing.is_empty() {
                tracing::warn!(patch = patch.id(), file, ?missing, "skipped: requirement not met");
                PatchStatus::Skipped { missing }
            } else {
                match patch.apply(&current)? {
                    PatchOutcome::Applied(next) => {
                        current = next;
                        PatchStatus::Applied
                    }
                    PatchOutcome::AlreadyApplied => PatchStatus::AlreadyApplied,
                    PatchOutcome::NotApplied(mismatch) => {
                        tracing::warn!(patch = patch.id(), file, %mismatch, "patch not applicable");
                        PatchStatus::NotApplied {
                            reason: mismatch.to_string(),
                        }
                    }
                }
            };

            patches.push(PatchReport {
                id: patch.id().to_string(),
                status,
            });
        }

        Ok(FileReport {
            file: file.to_string(),
            changed: current != text,
            patches,
            text: current,
        })
    }
}
