//! Gating patch sets on the upstream DevTools version.
//!
//! Patch sets may carry a semver range like ">=84.0.0, <86.0.0"; Chromium's
//! four-part DevTools versions are reduced to their first three components
//! before matching.

use semver::{Version, VersionReq};
use std::fmt;

#[derive(Debug, Clone)]
pub enum VersionError {
    /// Upstream version that is not even loosely semver
    InvalidVersion { value: String, source: String },
    /// Malformed `version_range`
    InvalidRequirement { value: String, source: String },
}

impl fmt::Display for VersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionError::InvalidVersion { value, source } => {
                write!(f, "invalid upstream version '{}': {}", value, source)
            }
            VersionError::InvalidRequirement { value, source } => {
                write!(f, "invalid version_range '{}': {}", value, source)
            }
        }
    }
}

impl std::error::Error for VersionError {}

/// Parse an upstream version, accepting Chromium's `major.minor.build.patch`.
pub fn parse_upstream(version: &str) -> Result<Version, VersionError> {
    let trimmed = version.trim();
    let candidate = match trimmed.split('.').count() {
        4 if !trimmed.contains(['-', '+']) => {
            trimmed.rsplit_once('.').map_or(trimmed, |(head, _)| head)
        }
        _ => trimmed,
    };
    Version::parse(candidate).map_err(|e| VersionError::InvalidVersion {
        value: version.to_string(),
        source: e.to_string(),
    })
}

/// Check if an upstream version matches a requirement string
///
/// # Examples
///
/// ```
/// use devtools_simpleview::config::version::matches_requirement;
///
/// assert!(matches_requirement("84.0.0", Some(">=84.0.0")).unwrap());
/// assert!(matches_requirement("85.0.564.40", Some(">=84.0.0, <86.0.0")).unwrap());
/// assert!(!matches_requirement("83.0.478", Some(">=84.0.0")).unwrap());
///
/// // None requirement means "apply to all versions"
/// assert!(matches_requirement("90.0.0", None).unwrap());
/// ```
pub fn matches_requirement(
    version: &str,
    requirement: Option<&str>,
) -> Result<bool, VersionError> {
    let Some(req_str) = requirement else {
        return Ok(true);
    };

    let req_str = req_str.trim();
    if req_str.is_empty() {
        return Ok(true);
    }

    let version = parse_upstream(version)?;
    let req = VersionReq::parse(req_str).map_err(|e| VersionError::InvalidRequirement {
        value: req_str.to_string(),
        source: e.to_string(),
    })?;

    Ok(req.matches(&version))
}
