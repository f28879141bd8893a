//! Process-wide environment access.
//!
//! Configuration loading reads variables while tests set and clear them; all
//! of it goes through one mutex so the unsynchronised std calls never race.

use std::env;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn lock() -> MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Set an environment variable while holding the global lock.
pub fn set_var<K: AsRef<OsStr>, V: AsRef<OsStr>>(key: K, value: V) {
    let _guard = lock();
    // SAFETY: the mutex serialises access to the unsynchronised std env calls.
    unsafe { env::set_var(key, value) };
}

/// Remove an environment variable while holding the global lock.
pub fn remove_var<K: AsRef<OsStr>>(key: K) {
    let _guard = lock();
    // SAFETY: the mutex serialises access to the unsynchronised std env calls.
    unsafe { env::remove_var(key) };
}

/// Read a non-empty path from the environment.
///
/// Paths need not be valid Unicode.
#[must_use]
pub fn path_var<K: AsRef<OsStr>>(key: K) -> Option<PathBuf> {
    let _guard = lock();
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
