//! Integration tests against the checked-in DevTools fixtures.

mod catalog_pipeline;
mod simple_view_patches;

use std::fs;
use std::path::{Path, PathBuf};

pub(crate) fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/devtools")
}

pub(crate) fn fixture(file: &str) -> String {
    let path = fixture_root().join(file);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("fixture {}: {e}", path.display()))
}
