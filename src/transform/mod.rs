//! The transformation primitive: find a fragment, replace it, report whether
//! anything changed.
//!
//! A [`Transform`] pairs a [`MatchSpec`] with a [`Replacement`] and a
//! [`Scope`]. The pair is validated at construction; applying a transform
//! reports "matched" or "did not match". Located sites are compiled into
//! [`Edit`]s and spliced by the edit primitive.

pub mod errors;
pub mod matcher;
pub mod replacer;

pub use errors::SpecError;
pub use matcher::{MatchSite, MatchSpec, Scope};
pub use replacer::{escape, Replacement};

use crate::edit::Edit;
use replacer::CompiledReplacement;

/// A validated match/replacement pair.
#[derive(Debug, Clone)]
pub struct Transform {
    spec: MatchSpec,
    replacement: Replacement,
    compiled: CompiledReplacement,
    scope: Scope,
}

/// Outcome of one transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Transformed carries the new text and whether it applied"]
pub struct Transformed {
    pub text: String,
    pub applied: bool,
}

impl Transform {
    pub fn new(spec: MatchSpec, replacement: Replacement, scope: Scope) -> Result<Self, SpecError> {
        let compiled = replacement.compile(&spec)?;
        Ok(Self {
            spec,
            replacement,
            compiled,
            scope,
        })
    }

    /// Replace the first occurrence of a literal anchor.
    pub fn literal(anchor: &str, text: &str) -> Result<Self, SpecError> {
        Self::new(
            MatchSpec::literal(anchor)?,
            Replacement::Literal(text.to_string()),
            Scope::First,
        )
    }

    /// Replace the first match of `pattern` with a capture template.
    pub fn pattern(pattern: &str, template: &str) -> Result<Self, SpecError> {
        Self::new(
            MatchSpec::pattern(pattern)?,
            Replacement::Template(template.to_string()),
            Scope::First,
        )
    }

    /// Insert `text` directly in front of the first occurrence of `anchor`.
    pub fn insert_before(anchor: &str, text: &str) -> Result<Self, SpecError> {
        Self::new(
            MatchSpec::literal(anchor)?,
            Replacement::insert_before(text),
            Scope::First,
        )
    }

    /// Rewrite every occurrence instead of the first.
    pub fn global(self) -> Self {
        Self {
            scope: Scope::All,
            ..self
        }
    }

    pub fn spec(&self) -> &MatchSpec {
        &self.spec
    }

    pub fn replacement(&self) -> &Replacement {
        &self.replacement
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Plan the edits this transform would make, without applying them.
    pub fn plan(&self, text: &str) -> Result<Vec<Edit>, SpecError> {
        Ok(self
            .spec
            .find(text, self.scope)?
            .into_iter()
            .map(|site| {
                let new_text = self.compiled.render(&site);
                Edit::new(site.byte_start, site.byte_end, new_text, site.text())
            })
            .collect())
    }

    /// Whether every site this transform would rewrite already sits inside
    /// its own rendered replacement.
    ///
    /// True when nothing matches. An insert keeps its anchor, so a bare
    /// "still matches" would re-apply forever; a site enclosed by the text it
    /// would render to has already been rewritten.
    pub fn is_settled(&self, text: &str) -> Result<bool, SpecError> {
        for site in self.spec.find(text, self.scope)? {
            let rendered = self.compiled.render(&site);
            if rendered.is_empty() {
                return Ok(false);
            }
            let enclosed = text.match_indices(rendered.as_str()).any(|(at, _)| {
                at <= site.byte_start && at + rendered.len() >= site.byte_end
            });
            if !enclosed {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Apply to `text`.
    ///
    /// A missing fragment yields `applied == false` with the text unchanged.
    /// Errors only surface specification faults, such as a pattern that
    /// matches zero-width inside `text`.
    pub fn apply(&self, text: &str) -> Result<Transformed, SpecError> {
        let edits = self.plan(text)?;
        if edits.is_empty() {
            return Ok(Transformed {
                text: text.to_string(),
                applied: false,
            });
        }

        let text = Edit::apply_all(text, edits)?;
        Ok(Transformed {
            text,
            applied: true,
        })
    }
}
