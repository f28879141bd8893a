//! `collate-json-reports` entry point.

use anyhow::Context;
use clap::Parser;
use collate_json_reports::cli_args::CollateArgs;
use collate_json_reports::{CollateMode, CollateOptions, collate_with_options, config};
use log::info;
use std::process::ExitCode;

fn run(args: &CollateArgs) -> anyhow::Result<()> {
    let config = config::load(args).context("cannot resolve options")?;
    let summary = collate_with_options(
        &config.reports,
        &config.collated_report,
        CollateOptions {
            pretty: config.pretty,
        },
    )
    .with_context(|| {
        format!(
            "cannot collate {} report(s) into '{}'",
            config.reports.len(),
            config.collated_report.display()
        )
    })?;
    match summary.mode {
        CollateMode::Copied => info!(
            "copied single report to '{}'",
            summary.destination.display()
        ),
        CollateMode::Merged => info!(
            "merged {} reports into '{}'",
            summary.reports,
            summary.destination.display()
        ),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    match run(&CollateArgs::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
