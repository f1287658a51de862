use crate::transform::errors::SpecError;
use regex::Regex;
use std::fmt;

/// What a transformation looks for.
#[derive(Debug, Clone)]
pub enum MatchSpec {
    /// Exact substring.
    Literal(String),
    /// Regular expression with optional capture groups.
    Pattern(Regex),
}

/// How many sites a transformation rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Leftmost occurrence only.
    #[default]
    First,
    /// Every non-overlapping occurrence, left to right.
    All,
}

/// One located occurrence of a match specification.
///
/// `groups[0]` is the whole match; absent optional groups are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSite<'t> {
    pub byte_start: usize,
    pub byte_end: usize,
    pub groups: Vec<Option<&'t str>>,
}

impl<'t> MatchSite<'t> {
    /// The full matched text.
    pub fn text(&self) -> &'t str {
        self.groups[0].unwrap_or_default()
    }
}

impl MatchSpec {
    /// Literal anchor. Empty anchors would match everywhere and are rejected.
    pub fn literal(anchor: impl Into<String>) -> Result<Self, SpecError> {
        let anchor = anchor.into();
        if anchor.is_empty() {
            return Err(SpecError::EmptyAnchor);
        }
        Ok(MatchSpec::Literal(anchor))
    }

    /// Compile a regex pattern.
    ///
    /// Patterns that can match the empty string are rejected: they would
    /// "apply" at offset 0 of any document.
    pub fn pattern(pattern: &str) -> Result<Self, SpecError> {
        let regex = Regex::new(pattern).map_err(|e| SpecError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        if regex.is_match("") {
            return Err(SpecError::EmptyMatch {
                pattern: pattern.to_string(),
            });
        }
        Ok(MatchSpec::Pattern(regex))
    }

    /// Number of addressable groups, including group 0.
    pub fn group_count(&self) -> usize {
        match self {
            MatchSpec::Literal(_) => 1,
            MatchSpec::Pattern(regex) => regex.captures_len(),
        }
    }

    /// Resolve a named group to its index.
    pub fn group_index(&self, name: &str) -> Option<usize> {
        match self {
            MatchSpec::Literal(_) => None,
            MatchSpec::Pattern(regex) => regex
                .capture_names()
                .position(|candidate| candidate == Some(name)),
        }
    }

    /// Locate occurrences in `text` according to `scope`.
    ///
    /// A pattern that matches zero-width inside `text` is a fault: an empty
    /// site would "apply" without touching anything it was written for.
    pub fn find<'t>(&self, text: &'t str, scope: Scope) -> Result<Vec<MatchSite<'t>>, SpecError> {
        let limit = match scope {
            Scope::First => 1,
            Scope::All => usize::MAX,
        };

        match self {
            MatchSpec::Literal(anchor) => Ok(text
                .match_indices(anchor.as_str())
                .take(limit)
                .map(|(start, found)| MatchSite {
                    byte_start: start,
                    byte_end: start + found.len(),
                    groups: vec![Some(found)],
                })
                .collect()),
            MatchSpec::Pattern(regex) => {
                let mut sites = Vec::new();
                for caps in regex.captures_iter(text).take(limit) {
                    let Some(whole) = caps.get(0) else { continue };
                    if whole.start() == whole.end() {
                        return Err(SpecError::EmptyMatch {
                            pattern: regex.as_str().to_string(),
                        });
                    }
                    sites.push(MatchSite {
                        byte_start: whole.start(),
                        byte_end: whole.end(),
                        groups: caps.iter().map(|g| g.map(|m| m.as_str())).collect(),
                    });
                }
                Ok(sites)
            }
        }
    }
}

impl fmt::Display for MatchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, body) = match self {
            MatchSpec::Literal(anchor) => ("text", anchor.as_str()),
            MatchSpec::Pattern(regex) => ("regex", regex.as_str()),
        };
        // Keep diagnostics for long anchors on one line
        let mut short: String = body.chars().take(72).collect();
        if short.len() < body.len() {
            short.push('…');
        }
        write!(f, "{kind} `{}`", short.replace('\n', "\\n"))
    }
}
