//! Helpers shared by unit and integration tests.
//!
//! Environment changes go through [`crate::environment`] so parallel tests
//! cannot race on process-wide state.

use crate::environment;
use std::path::{Path, PathBuf};

/// Set an environment variable for testing.
pub fn set_var<K: AsRef<std::ffi::OsStr>, V: AsRef<std::ffi::OsStr>>(key: K, value: V) {
    environment::set_var(key, value);
}

/// Remove an environment variable set during testing.
pub fn remove_var<K: AsRef<std::ffi::OsStr>>(key: K) {
    environment::remove_var(key);
}

/// Clears the given variables on creation and again on drop.
pub struct EnvGuard {
    keys: Vec<&'static str>,
}

impl EnvGuard {
    #[must_use]
    pub fn new(keys: &[&'static str]) -> Self {
        for key in keys {
            remove_var(key);
        }
        Self {
            keys: keys.to_vec(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in &self.keys {
            remove_var(key);
        }
    }
}

/// Write `content` to `dir/name` and return the path.
///
/// # Panics
///
/// Panics if the file cannot be written.
#[must_use]
pub fn write_report(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write report fixture");
    path
}
