use std::io::Write;
use std::path::Path;
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// The fundamental edit primitive: byte-span replacement with verification.
///
/// Every transformation compiles down to a set of these. Intelligence lives in
/// span acquisition (literal anchors, regex captures), not in application.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until applied to a text"]
pub struct Edit {
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    /// New text to insert at [byte_start, byte_end)
    pub new_text: String,
    /// Verification of what we expect to find before applying
    pub expected_before: EditVerification,
}

/// Verification strategy for edit safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (cheaper to carry for large spans)
    Hash(u64),
}

impl EditVerification {
    /// Check if the provided text matches the verification criteria.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("before-text verification failed at byte {byte_start}")]
    BeforeTextMismatch {
        byte_start: usize,
        byte_end: usize,
        found: String,
    },

    #[error("invalid byte range: [{byte_start}, {byte_end}) in text of length {text_len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        text_len: usize,
    },

    #[error("byte range [{byte_start}, {byte_end}) does not fall on UTF-8 character boundaries")]
    NotCharBoundary { byte_start: usize, byte_end: usize },

    #[error("edits overlap at byte {at}")]
    Overlapping { at: usize },
}

impl Edit {
    /// Create a new edit with automatic verification generation.
    pub fn new(
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        expected_before: &str,
    ) -> Self {
        Self {
            byte_start,
            byte_end,
            new_text: new_text.into(),
            expected_before: EditVerification::from_text(expected_before),
        }
    }

    /// Validate the edit against the current text.
    ///
    /// Returns the current text at [byte_start, byte_end) if validation succeeds.
    fn validate<'a>(&self, text: &'a str) -> Result<&'a str, EditError> {
        if self.byte_start > self.byte_end || self.byte_end > text.len() {
            return Err(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                text_len: text.len(),
            });
        }

        let current = text
            .get(self.byte_start..self.byte_end)
            .ok_or(EditError::NotCharBoundary {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
            })?;

        // Already applied
        if current == self.new_text {
            return Ok(current);
        }

        if !self.expected_before.matches(current) {
            return Err(EditError::BeforeTextMismatch {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                found: current.to_string(),
            });
        }

        Ok(current)
    }

    /// Apply this edit to `text`, returning the new text.
    pub fn apply_to(&self, text: &str) -> Result<String, EditError> {
        Edit::apply_all(text, vec![self.clone()])
    }

    /// Apply several non-overlapping edits to the same text.
    ///
    /// Edits are sorted by byte_start descending and spliced bottom-to-top so
    /// earlier offsets stay valid. Every edit is validated before any splice.
    pub fn apply_all(text: &str, mut edits: Vec<Edit>) -> Result<String, EditError> {
        edits.sort_by(|a, b| b.byte_start.cmp(&a.byte_start));

        for edit in &edits {
            edit.validate(text)?;
        }

        // Sorted descending: the earlier edit must end before the later one starts
        for window in edits.windows(2) {
            let (later, earlier) = (&window[0], &window[1]);
            if earlier.byte_end > later.byte_start {
                return Err(EditError::Overlapping {
                    at: later.byte_start,
                });
            }
        }

        let mut out = text.to_string();
        for edit in &edits {
            if out[edit.byte_start..edit.byte_end] == edit.new_text {
                continue;
            }
            out.replace_range(edit.byte_start..edit.byte_end, &edit.new_text);
        }

        Ok(out)
    }
}

/// Atomic file write: tempfile + fsync + rename, then bump the mtime.
///
/// Either the full write succeeds or the original file is left untouched.
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Path has no parent directory",
        )
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    // Downstream bundlers watch mtimes
    filetime::set_file_mtime(path, filetime::FileTime::now())?;

    Ok(())
}
