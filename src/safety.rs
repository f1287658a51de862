use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// The DevTools output directory patches are allowed to touch.
#[derive(Debug, Clone)]
pub struct TargetRoot {
    /// Canonical absolute path
    root: PathBuf,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("target file must be a relative path: {file}")]
    NotRelative { file: String },

    #[error("target file escapes the DevTools root: {file}")]
    Escapes { file: String },

    #[error("path resolves outside the DevTools root: {path} (root: {root})")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("failed to canonicalize {path}: {source}")]
    Canonicalize {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl TargetRoot {
    /// Canonicalize `root`; it must exist.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        let root = root.as_ref();
        let root = root
            .canonicalize()
            .map_err(|source| SafetyError::Canonicalize {
                path: root.to_path_buf(),
                source,
            })?;
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolve a catalog file identity (`/`-separated, relative) to a path
    /// under the root.
    ///
    /// Existing files are canonicalized so symlinks pointing out of the root
    /// are rejected. Missing files resolve lexically; reading them is the
    /// caller's business.
    pub fn resolve(&self, file: &str) -> Result<PathBuf, SafetyError> {
        let relative = Path::new(file);
        let mut joined = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => joined.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    return Err(SafetyError::Escapes {
                        file: file.to_string(),
                    })
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(SafetyError::NotRelative {
                        file: file.to_string(),
                    })
                }
            }
        }

        if !joined.exists() {
            return Ok(joined);
        }

        let canonical = joined
            .canonicalize()
            .map_err(|source| SafetyError::Canonicalize {
                path: joined.clone(),
                source,
            })?;
        if !canonical.starts_with(&self.root) {
            return Err(SafetyError::OutsideRoot {
                path: canonical,
                root: self.root.clone(),
            });
        }
        Ok(canonical)
    }
}
