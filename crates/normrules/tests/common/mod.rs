//! Common test utilities.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

/// The normrules binary under test.
pub fn normrules_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_normrules"))
}

/// Rule and tag files shared with the core crate's tests.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("normrules-core")
        .join("tests")
        .join("fixtures")
}

pub const PRIV_URL: &str = "https://example.org/priv.html";
pub const UNPRIV_URL: &str = "https://example.org/unpriv.html";

/// Create a temporary project holding the fixtures and a `normrules.yaml`
/// that lists them with their document URLs.
pub fn create_temp_project() -> tempfile::TempDir {
    let temp = tempfile::tempdir().expect("Failed to create temp dir");
    let fixtures = fixtures_dir();

    for name in [
        "priv-rules.yaml",
        "unpriv-rules.yaml",
        "priv-tags.json",
        "unpriv-tags.json",
    ] {
        std::fs::copy(fixtures.join(name), temp.path().join(name))
            .unwrap_or_else(|e| panic!("Failed to copy {name}: {e}"));
    }

    let config = format!(
        "definitions:\n  - priv-rules.yaml\n  - unpriv-rules.yaml\n\
         tags:\n  - path: priv-tags.json\n    url: {PRIV_URL}\n  \
         - path: unpriv-tags.json\n    url: {UNPRIV_URL}\n"
    );
    std::fs::write(temp.path().join("normrules.yaml"), config)
        .expect("Failed to write normrules.yaml");

    temp
}

/// Write `content` to `name` inside `dir` and return the path.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap_or_else(|e| panic!("Failed to write {name}: {e}"));
    path
}
