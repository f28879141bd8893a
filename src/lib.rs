//! Collate JSON test reports.
//!
//! A test harness that reruns flaky tests leaves one JSON report per run.
//! [`collate`] combines them: array-valued keys accumulate across every
//! report, while `tests_failures` reflects only the final run.

pub mod cli_args;
pub mod collate;
pub mod config;
pub mod environment;
pub mod error;
pub mod report;
pub mod test_utils;

pub use collate::{CollateMode, CollateOptions, CollateSummary, collate, collate_with_options};
pub use error::{CollateError, MergeError};
pub use report::{TESTS_FAILURES, TESTS_SUMMARY_MESSAGES, fold_reports, merge_reports};
