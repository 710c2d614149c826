use std::path::{Path, PathBuf};

/// Resolves a file under `tests/fixtures/` regardless of the working
/// directory `cargo test` happens to use.
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}
