//! Error types raised while collating reports.
//!
//! Every variant that concerns a file carries its path so the message shown
//! to the user identifies the offending input or destination.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while folding one report into the accumulator.
#[derive(Debug, Error)]
pub enum MergeError {
    /// The document is valid JSON but not a JSON object.
    #[error("report is not a JSON object")]
    NotAnObject,
    /// A key that must concatenate holds something other than an array.
    #[error("value for `{key}` in the {side} report is not an array")]
    NotAnArray {
        /// Offending top-level key.
        key: Box<str>,
        /// Which side of the merge held the bad value.
        side: Side,
    },
}

/// Which document a [`MergeError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The accumulator seeded from the first report.
    Base,
    /// The report currently being folded in.
    Incoming,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Base => "base",
            Self::Incoming => "incoming",
        })
    }
}

/// Errors surfaced by [`crate::collate()`].
///
/// Underlying causes are exposed through [`std::error::Error::source`]
/// rather than repeated in the message.
#[derive(Debug, Error)]
pub enum CollateError {
    /// The report list was empty.
    #[error("No JSON report files found")]
    NoReports,
    /// A listed report does not exist; `index` is its position in the list.
    #[error("JSON report not found: '{}'", path.display())]
    InputNotFound { index: usize, path: PathBuf },
    /// A report exists but could not be read.
    #[error("failed to read JSON report '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A report is not valid JSON.
    #[error("invalid JSON in report '{}'", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A report is valid JSON but does not fit the accumulator.
    #[error("cannot merge report '{}'", path.display())]
    Merge {
        path: PathBuf,
        #[source]
        source: MergeError,
    },
    /// The collated report could not be written to its destination.
    #[error("failed to write collated report '{}'", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
