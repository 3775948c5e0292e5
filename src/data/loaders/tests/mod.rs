//! Loader tests over on-disk fixtures.
//!
//! Every fixture is written into a fresh temporary directory so the tests
//! exercise the same path-based entry points the engine uses.

mod envi_tests;
mod npy_tests;

use std::path::{Path, PathBuf};

/// Write `bytes` to `dir/name` and return the full path.
pub(super) fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
