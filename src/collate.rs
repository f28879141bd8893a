//! Collate JSON test reports into a single document on disk.
//!
//! One report is copied byte-for-byte. Several reports are parsed, folded
//! with [`fold_reports`] in input order, and serialised. Either way the
//! destination is replaced atomically, so a failure never leaves a partial
//! file behind.

use crate::error::CollateError;
use crate::report::fold_reports;
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

/// Output formatting options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollateOptions {
    /// Pretty-print merged output. Ignored when a single report is copied.
    pub pretty: bool,
}

/// How the collated report was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollateMode {
    /// The only report was copied unchanged.
    Copied,
    /// Several reports were merged.
    Merged,
}

/// Outcome of a successful collation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollateSummary {
    /// Number of reports collated.
    pub reports: usize,
    /// Whether the output was copied or merged.
    pub mode: CollateMode,
    /// Where the collated report was written.
    pub destination: PathBuf,
}

/// Collate `reports` into `collated_report` with default options.
///
/// # Errors
///
/// See [`collate_with_options`].
pub fn collate(reports: &[PathBuf], collated_report: &Path) -> Result<CollateSummary, CollateError> {
    collate_with_options(reports, collated_report, CollateOptions::default())
}

/// Collate `reports` into `collated_report`.
///
/// # Errors
///
/// Returns [`CollateError::NoReports`] for an empty list and
/// [`CollateError::InputNotFound`] if any report is missing; both are
/// checked before anything is read or written. Unreadable, invalid or
/// unmergeable reports and write failures map to the remaining variants.
pub fn collate_with_options(
    reports: &[PathBuf],
    collated_report: &Path,
    options: CollateOptions,
) -> Result<CollateSummary, CollateError> {
    ensure_reports_exist(reports)?;

    let (bytes, mode) = match reports {
        [] => return Err(CollateError::NoReports),
        [only] => (read_report(only)?, CollateMode::Copied),
        [first, rest @ ..] => {
            let merged = merge_files(first, rest)?;
            (serialise(&merged, collated_report, options)?, CollateMode::Merged)
        }
    };

    write_atomically(collated_report, &bytes)?;
    info!(
        "collated {} report(s) into '{}'",
        reports.len(),
        collated_report.display()
    );
    Ok(CollateSummary {
        reports: reports.len(),
        mode,
        destination: collated_report.to_path_buf(),
    })
}

fn ensure_reports_exist(reports: &[PathBuf]) -> Result<(), CollateError> {
    match reports.iter().enumerate().find(|(_, p)| !p.is_file()) {
        Some((index, path)) => Err(CollateError::InputNotFound {
            index,
            path: path.clone(),
        }),
        None => Ok(()),
    }
}

fn read_report(path: &Path) -> Result<Vec<u8>, CollateError> {
    fs::read(path).map_err(|source| CollateError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_report(path: &Path) -> Result<Value, CollateError> {
    let bytes = read_report(path)?;
    serde_json::from_slice(&bytes).map_err(|source| CollateError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn merge_files(first: &Path, rest: &[PathBuf]) -> Result<Value, CollateError> {
    let base = parse_report(first)?;
    let incoming = rest
        .iter()
        .map(|path| parse_report(path))
        .collect::<Result<Vec<_>, _>>()?;
    let merged = fold_reports(base, incoming).map_err(|(index, source)| CollateError::Merge {
        path: rest.get(index).cloned().unwrap_or_default(),
        source,
    })?;
    debug!("merged {} report(s) into '{}'", rest.len(), first.display());
    Ok(merged)
}

fn serialise(
    report: &Value,
    destination: &Path,
    options: CollateOptions,
) -> Result<Vec<u8>, CollateError> {
    let bytes = if options.pretty {
        serde_json::to_vec_pretty(report)
    } else {
        serde_json::to_vec(report)
    };
    bytes.map_err(|e| CollateError::Write {
        path: destination.to_path_buf(),
        source: e.into(),
    })
}

fn write_atomically(destination: &Path, bytes: &[u8]) -> Result<(), CollateError> {
    let write_err = |source| CollateError::Write {
        path: destination.to_path_buf(),
        source,
    };
    let parent = match destination.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(write_err)?;

    let mut tmp = temp_file_in(parent).map_err(write_err)?;
    // An overwritten report keeps its mode, as it would under a plain write.
    if let Some(existing) = fs::metadata(destination).ok().filter(fs::Metadata::is_file) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(write_err)?;
    }
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(destination).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Create the staging file with the mode a freshly created file would get
/// (0o666 less the umask) instead of the owner-only default.
#[cfg(unix)]
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;
    Builder::new()
        .prefix(".collated-")
        .permissions(fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    Builder::new().prefix(".collated-").tempfile_in(dir)
}
