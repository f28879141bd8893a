//! Configuration loading.
//!
//! Sources are layered with `figment`, lowest priority first: built-in
//! defaults, a TOML config file, `COLLATE_JSON_REPORTS_*` environment
//! variables, then command-line arguments.

use crate::cli_args::CollateArgs;
use crate::environment;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix shared by every environment variable the tool reads.
pub const ENV_PREFIX: &str = "COLLATE_JSON_REPORTS_";

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "COLLATE_JSON_REPORTS_CONFIG_PATH";

/// Config file picked up from the working directory when nothing else is set.
pub const DEFAULT_CONFIG_FILE: &str = ".collate_json_reports.toml";

/// Destination used when none is configured.
pub const DEFAULT_COLLATED_REPORT: &str = "result.json";

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CollateConfig {
    /// Reports to collate, in merge order.
    #[serde(default, deserialize_with = "paths_from_list_or_string")]
    pub reports: Vec<PathBuf>,
    /// Destination of the collated report.
    pub collated_report: PathBuf,
    /// Pretty-print merged output.
    #[serde(default)]
    pub pretty: bool,
}

impl Default for CollateConfig {
    fn default() -> Self {
        Self {
            reports: Vec::new(),
            collated_report: PathBuf::from(DEFAULT_COLLATED_REPORT),
            pretty: false,
        }
    }
}

/// One path as figment hands it over. Environment values are parsed by
/// type, so a bare `2024` or `true` arrives as a number or boolean.
#[derive(Deserialize)]
#[serde(untagged)]
enum PathItem {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Flag(bool),
}

impl From<PathItem> for String {
    fn from(item: PathItem) -> Self {
        match item {
            PathItem::Text(text) => text,
            PathItem::Unsigned(n) => n.to_string(),
            PathItem::Signed(n) => n.to_string(),
            PathItem::Flag(flag) => flag.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PathList {
    Many(Vec<PathItem>),
    Joined(PathItem),
}

/// Accept either a list of paths or a single comma-separated string, the
/// latter being the natural shape of an environment variable. Paths that
/// contain a comma must use the list form.
fn paths_from_list_or_string<'de, D>(deserializer: D) -> Result<Vec<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match PathList::deserialize(deserializer)? {
        PathList::Many(items) => items
            .into_iter()
            .map(|item| PathBuf::from(String::from(item)))
            .collect(),
        PathList::Joined(item) => String::from(item)
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect(),
    })
}

/// Failure to resolve settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be parsed or did not fit [`CollateConfig`].
    #[error("configuration error")]
    Gathering(#[from] Box<figment::Error>),
    /// An explicitly named config file does not exist.
    #[error("configuration error: config file not found: '{}'", .0.display())]
    MissingFile(PathBuf),
    /// No source listed any report.
    #[error("No JSON report files found")]
    NoReports,
}

fn config_file(cli: &CollateArgs) -> Result<Option<PathBuf>, ConfigError> {
    let explicit = cli
        .config
        .clone()
        .or_else(|| environment::path_var(CONFIG_PATH_ENV));
    match explicit {
        Some(path) if path.is_file() => Ok(Some(path)),
        Some(path) => Err(ConfigError::MissingFile(path)),
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            Ok(fallback.is_file().then(|| fallback.to_path_buf()))
        }
    }
}

/// Build the layered provider for `cli` without extracting it.
///
/// # Errors
///
/// Returns [`ConfigError::MissingFile`] when an explicitly named config file
/// does not exist.
pub fn figment_for(cli: &CollateArgs) -> Result<Figment, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(CollateConfig::default()));
    if let Some(path) = config_file(cli)? {
        log::debug!("reading configuration from '{}'", path.display());
        figment = figment.merge(Toml::file(path));
    }
    Ok(figment
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config_path"]))
        .merge(Serialized::defaults(cli)))
}

/// Resolve the settings for this run.
///
/// # Errors
///
/// Returns [`ConfigError::Gathering`] when a source cannot be parsed,
/// [`ConfigError::MissingFile`] for a missing explicit config file and
/// [`ConfigError::NoReports`] when no report was configured anywhere.
pub fn load(cli: &CollateArgs) -> Result<CollateConfig, ConfigError> {
    let config: CollateConfig = figment_for(cli)?.extract().map_err(Box::new)?;
    if config.reports.is_empty() {
        return Err(ConfigError::NoReports);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{EnvGuard, set_var};
    use rstest::rstest;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    const KEYS: &[&str] = &[
        CONFIG_PATH_ENV,
        "COLLATE_JSON_REPORTS_REPORTS",
        "COLLATE_JSON_REPORTS_COLLATED_REPORT",
        "COLLATE_JSON_REPORTS_PRETTY",
    ];

    fn write_config(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("create config dir");
        let path = dir.path().join("collate.toml");
        fs::write(&path, content).expect("write config");
        (dir, path)
    }

    fn cli_with_reports(reports: &[&str]) -> CollateArgs {
        CollateArgs {
            reports: reports.iter().map(PathBuf::from).collect(),
            ..CollateArgs::default()
        }
    }

    #[test]
    #[serial]
    fn defaults_collated_report_to_result_json() {
        let _guard = EnvGuard::new(KEYS);

        let config = load(&cli_with_reports(&["a.json"])).expect("load config");

        assert_eq!(config.collated_report, PathBuf::from("result.json"));
        assert!(!config.pretty);
    }

    #[test]
    #[serial]
    fn empty_report_list_is_rejected() {
        let _guard = EnvGuard::new(KEYS);

        let err = load(&CollateArgs::default()).expect_err("no reports");

        assert!(matches!(err, ConfigError::NoReports));
        assert_eq!(err.to_string(), "No JSON report files found");
    }

    #[test]
    #[serial]
    fn environment_supplies_reports_and_destination() {
        let _guard = EnvGuard::new(KEYS);
        set_var("COLLATE_JSON_REPORTS_REPORTS", "one.json, two.json");
        set_var("COLLATE_JSON_REPORTS_COLLATED_REPORT", "env.json");

        let config = load(&CollateArgs::default()).expect("load config");

        assert_eq!(
            config.reports,
            vec![PathBuf::from("one.json"), PathBuf::from("two.json")]
        );
        assert_eq!(config.collated_report, PathBuf::from("env.json"));
    }

    #[test]
    #[serial]
    fn cli_overrides_environment_and_file() {
        let _guard = EnvGuard::new(KEYS);
        let (_dir, path) = write_config(
            "reports = [\"file.json\"]\ncollated_report = \"file-out.json\"\npretty = true\n",
        );
        set_var("COLLATE_JSON_REPORTS_COLLATED_REPORT", "env.json");
        let cli = CollateArgs {
            reports: vec![PathBuf::from("cli.json")],
            config: Some(path),
            ..CollateArgs::default()
        };

        let config = load(&cli).expect("load config");

        assert_eq!(config.reports, vec![PathBuf::from("cli.json")]);
        assert_eq!(config.collated_report, PathBuf::from("env.json"));
        // `--pretty` was not passed, so the file's value survives.
        assert!(config.pretty);
    }

    #[test]
    #[serial]
    fn config_path_can_come_from_environment() {
        let _guard = EnvGuard::new(KEYS);
        let (_dir, path) = write_config("reports = [\"a.json\", \"b.json\"]\n");
        set_var(CONFIG_PATH_ENV, &path);

        let config = load(&CollateArgs::default()).expect("load config");

        assert_eq!(
            config.reports,
            vec![PathBuf::from("a.json"), PathBuf::from("b.json")]
        );
    }

    #[test]
    #[serial]
    fn missing_explicit_config_file_is_an_error() {
        let _guard = EnvGuard::new(KEYS);
        let cli = CollateArgs {
            config: Some(PathBuf::from("definitely/not/here.toml")),
            ..cli_with_reports(&["a.json"])
        };

        assert!(matches!(load(&cli), Err(ConfigError::MissingFile(_))));
    }

    #[test]
    #[serial]
    fn broken_config_file_reports_configuration_error() {
        let _guard = EnvGuard::new(KEYS);
        let (_dir, path) = write_config("not = [valid");
        let cli = CollateArgs {
            config: Some(path),
            ..cli_with_reports(&["a.json"])
        };

        let err = load(&cli).expect_err("broken config");

        assert!(err.to_string().starts_with("configuration error"));
    }

    #[rstest]
    #[case::number("2024", &["2024"])]
    #[case::flag("true", &["true"])]
    #[case::array("[a.json, b.json]", &["a.json", "b.json"])]
    #[serial]
    fn environment_reports_accept_typed_values(#[case] raw: &str, #[case] expected: &[&str]) {
        let _guard = EnvGuard::new(KEYS);
        set_var("COLLATE_JSON_REPORTS_REPORTS", raw);

        let config = load(&CollateArgs::default()).expect("load config");

        let expected: Vec<PathBuf> = expected.iter().map(PathBuf::from).collect();
        assert_eq!(config.reports, expected);
    }

    #[test]
    #[serial]
    fn list_form_keeps_commas_inside_paths() {
        let _guard = EnvGuard::new(KEYS);
        let (_dir, path) = write_config("reports = [\"run 1, retry.json\"]\n");
        let cli = CollateArgs {
            config: Some(path),
            ..CollateArgs::default()
        };

        let config = load(&cli).expect("load config");

        assert_eq!(config.reports, vec![PathBuf::from("run 1, retry.json")]);
    }
}
