use crate::edit::EditError;
use thiserror::Error;

/// A match/replacement specification that is internally inconsistent.
///
/// These are programming faults in a patch definition, never upstream drift.
/// A fragment that simply is not present is reported as data, not as one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("literal anchor is empty")]
    EmptyAnchor,

    #[error("pattern `{pattern}` produces a zero-width match")]
    EmptyMatch { pattern: String },

    #[error("replacement references capture `{reference}` but the match only provides {available}")]
    DanglingCapture {
        reference: String,
        available: String,
    },

    #[error("malformed replacement template at byte {offset}: {message}")]
    MalformedTemplate { offset: usize, message: String },

    #[error("patch id '{id}' is defined more than once")]
    DuplicatePatchId { id: String },

    #[error("patch '{patch}' requires '{requires}', which is not an earlier patch for {file}")]
    UnknownDependency {
        patch: String,
        requires: String,
        file: String,
    },

    #[error("named patch '{id}' has no transformation steps")]
    EmptyPatch { id: String },

    #[error("edit error: {0}")]
    Edit(#[from] EditError),
}
