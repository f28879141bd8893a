//! Command-line argument structures.
//!
//! The struct doubles as the highest-priority configuration layer, so fields
//! left at their clap defaults are skipped when serialised and cannot mask
//! values from the config file or environment.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn is_false<T>(flag: &T) -> bool
where
    T: Copy + std::ops::Not<Output = bool>,
{
    !*flag
}

/// Collate JSON test reports into a single report.
#[derive(Parser, Deserialize, Serialize, Default, Debug, Clone)]
#[command(
    name = "collate-json-reports",
    about = "Combine JSON test reports; the last report's failures win"
)]
pub struct CollateArgs {
    /// JSON reports to collate. The first is the base the others merge into
    #[arg(value_name = "REPORT", num_args = 0..)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reports: Vec<PathBuf>,
    /// Where to write the collated report [default: result.json]
    #[arg(short = 'o', long, value_name = "PATH")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collated_report: Option<PathBuf>,
    /// Pretty-print the merged report
    #[arg(long)]
    #[serde(default, skip_serializing_if = "is_false")]
    pub pretty: bool,
    /// Read configuration from this TOML file
    #[arg(long, value_name = "PATH")]
    #[serde(skip)]
    pub config: Option<PathBuf>,
}
