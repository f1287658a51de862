//! Named patches: one behavior, one target file, one or more transforms.
//!
//! A named patch is all-or-nothing. Its steps run in order against a working
//! copy of the document; if any step fails to match, the caller gets
//! [`PatchOutcome::NotApplied`] and none of the partial work.

pub mod catalog;
pub mod css;
pub mod simple_view;

pub use catalog::{FileReport, PatchCatalog, PatchReport, PatchStatus};
pub use css::{CssNewline, CssRule};
pub use simple_view::SimpleViewOptions;

use crate::transform::{SpecError, Transform};
use serde::Serialize;
use std::fmt;

/// A semantically named rewrite of one upstream file.
#[derive(Debug, Clone)]
pub struct NamedPatch {
    id: String,
    file: String,
    description: String,
    steps: Vec<Transform>,
    markers: Vec<String>,
    requires: Vec<String>,
}

/// Result of applying a named patch to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "PatchOutcome should be checked for NotApplied"]
pub enum PatchOutcome {
    /// Every step matched; the new text.
    Applied(String),
    /// The patch's markers are already present; the document was left as-is.
    AlreadyApplied,
    /// A step's fragment was not found. The document was left as-is.
    NotApplied(Mismatch),
}

/// Which step of a named patch failed to find its fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// Zero-based step index
    pub step: usize,
    pub steps: usize,
    /// Rendered match specification of the failing step
    pub expected: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {}/{}: {} not found",
            self.step + 1,
            self.steps,
            self.expected
        )
    }
}

impl NamedPatch {
    pub fn new(id: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            file: file.into(),
            description: String::new(),
            steps: Vec::new(),
            markers: Vec::new(),
            requires: Vec::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a transformation step.
    pub fn step(mut self, transform: Transform) -> Self {
        self.steps.push(transform);
        self
    }

    /// Text whose presence proves this patch already took effect.
    ///
    /// All markers must be present for the patch to count as applied.
    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.push(marker.into());
        self
    }

    /// Declare that this patch only makes sense after `id` took effect.
    pub fn requires(mut self, id: impl Into<String>) -> Self {
        self.requires.push(id.into());
        self
    }

    /// Fail fast on patches that can never apply.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.steps.is_empty() {
            return Err(SpecError::EmptyPatch {
                id: self.id.clone(),
            });
        }
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn steps(&self) -> &[Transform] {
        &self.steps
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn dependencies(&self) -> &[String] {
        &self.requires
    }

    /// Whether `text` already carries this patch.
    ///
    /// Every marker must be present, and the first step must have nothing
    /// left to rewrite. Marker text that merely occurs elsewhere in an
    /// unpatched document does not count.
    pub fn is_applied(&self, text: &str) -> Result<bool, SpecError> {
        if self.markers.is_empty() || !self.markers.iter().all(|m| text.contains(m.as_str())) {
            return Ok(false);
        }
        match self.steps.first() {
            Some(first) => first.is_settled(text),
            None => Ok(false),
        }
    }

    /// Apply every step, or none.
    pub fn apply(&self, text: &str) -> Result<PatchOutcome, SpecError> {
        self.validate()?;

        if self.is_applied(text)? {
            tracing::debug!(patch = %self.id, file = %self.file, "already applied");
            return Ok(PatchOutcome::AlreadyApplied);
        }

        let mut working = text.to_string();
        for (index, transform) in self.steps.iter().enumerate() {
            let result = transform.apply(&working)?;
            if !result.applied {
                let mismatch = Mismatch {
                    step: index,
                    steps: self.steps.len(),
                    expected: transform.spec().to_string(),
                };
                tracing::debug!(patch = %self.id, file = %self.file, %mismatch, "fragment not found");
                return Ok(PatchOutcome::NotApplied(mismatch));
            }
            working = result.text;
        }

        tracing::debug!(patch = %self.id, file = %self.file, steps = self.steps.len(), "applied");
        Ok(PatchOutcome::Applied(working))
    }

    /// The `text -> text | none` contract.
    ///
    /// `Some` carries the patched document (the input itself when already
    /// applied); `None` is the no-op sentinel for a missing fragment.
    pub fn patch(&self, text: &str) -> Result<Option<String>, SpecError> {
        Ok(match self.apply(text)? {
            PatchOutcome::Applied(patched) => Some(patched),
            PatchOutcome::AlreadyApplied => Some(text.to_string()),
            PatchOutcome::NotApplied(_) => None,
        })
    }
}
