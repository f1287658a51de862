//! Orchestrator: read each catalog file under the DevTools root, run its
//! patch list, write the result back.

use crate::edit::atomic_write;
use crate::patch::{FileReport, PatchCatalog, PatchReport};
use crate::safety::{SafetyError, TargetRoot};
use crate::transform::SpecError;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Safety(#[from] SafetyError),

    #[error(transparent)]
    Spec(#[from] SpecError),
}

/// Outcome for one target file.
#[derive(Debug, Clone, Serialize)]
pub struct FileRun {
    pub file: String,
    pub path: PathBuf,
    /// The file does not exist under the root
    pub missing: bool,
    /// New text was written to disk
    pub written: bool,
    /// `None` when the file is missing
    pub report: Option<FileReport>,
    /// Text as read from disk
    #[serde(skip)]
    pub original: Option<String>,
}

impl FileRun {
    pub fn changed(&self) -> bool {
        self.report.as_ref().is_some_and(|r| r.changed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub root: PathBuf,
    pub dry_run: bool,
    pub files: Vec<FileRun>,
}

impl RunReport {
    /// Every patch that did not take effect, with its file.
    pub fn not_applied(&self) -> impl Iterator<Item = (&str, &PatchReport)> {
        self.files.iter().flat_map(|run| {
            run.report
                .iter()
                .flat_map(|report| report.not_applied())
                .map(move |patch| (run.file.as_str(), patch))
        })
    }

    pub fn missing_files(&self) -> impl Iterator<Item = &FileRun> {
        self.files.iter().filter(|run| run.missing)
    }

    pub fn changed_files(&self) -> impl Iterator<Item = &FileRun> {
        self.files.iter().filter(|run| run.changed())
    }

    /// All patches took effect and every file was found.
    pub fn is_complete(&self) -> bool {
        self.not_applied().next().is_none() && self.missing_files().next().is_none()
    }
}

/// Runs a catalog against one DevTools root.
#[derive(Debug)]
pub struct Runner<'a> {
    catalog: &'a PatchCatalog,
    root: TargetRoot,
    dry_run: bool,
}

impl<'a> Runner<'a> {
    pub fn new(catalog: &'a PatchCatalog, root: TargetRoot) -> Self {
        Self {
            catalog,
            root,
            dry_run: false,
        }
    }

    /// Compute results without writing anything.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Process every file of the catalog in sorted order.
    ///
    /// Missing files are reported, not fatal; other I/O failures abort.
    pub fn run(&self) -> Result<RunReport, RunError> {
        let mut files = Vec::new();
        for file in self.catalog.files() {
            files.push(self.run_file(file)?);
        }
        Ok(RunReport {
            root: self.root.path().to_path_buf(),
            dry_run: self.dry_run,
            files,
        })
    }

    fn run_file(&self, file: &str) -> Result<FileRun, RunError> {
        let path = self.root.resolve(file)?;

        let original = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                tracing::warn!(file, path = %path.display(), "target file missing");
                return Ok(FileRun {
                    file: file.to_string(),
                    path,
                    missing: true,
                    written: false,
                    report: None,
                    original: None,
                });
            }
            Err(source) => return Err(RunError::Io { path, source }),
        };

        let report = self.catalog.apply_file(file, &original)?;

        let mut written = false;
        if report.changed && !self.dry_run {
            atomic_write(&path, report.text.as_bytes()).map_err(|source| RunError::Io {
                path: path.clone(),
                source,
            })?;
            written = true;
            tracing::info!(file, path = %path.display(), "patched file written");
        } else if report.changed {
            tracing::info!(file, "dry run: file would change");
        }

        Ok(FileRun {
            file: file.to_string(),
            path,
            missing: false,
            written,
            report: Some(report),
            original: Some(original),
        })
    }
}
