//! CLI settings: flags, environment and an optional TOML file.
//!
//! Precedence is flags, then environment, then the file, then defaults.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Args;
use sentinel_dashboard_models::{
    CustomRange, InvalidRangeError, LabelLocale, LabelOptions, ParseTimeFilterError, TimeFilter,
};
use serde::Deserialize;

/// Errors while loading or resolving CLI settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Filter(#[from] ParseTimeFilterError),

    #[error(transparent)]
    Range(#[from] InvalidRangeError),

    #[error("UTC offset of {0} minutes is out of range")]
    Offset(i32),
}

/// Contents of a `--config` file.
///
/// ```toml
/// api_url = "http://localhost:8080/api"
/// default_filter = "7d"
/// locale = "en-us"
/// utc_offset_minutes = -180
/// fetch_window = "all"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub api_url: Option<String>,
    pub default_filter: Option<String>,
    pub locale: Option<LabelLocale>,
    pub utc_offset_minutes: Option<i32>,
    pub fetch_window: Option<String>,
}

impl CliConfig {
    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or is not valid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }
}

/// Flags shared by every dashboard-rendering command.
#[derive(Debug, Clone, Default, Args)]
pub struct ViewArgs {
    /// Preset window: 1h, 1d, 7d, 30d, 90d or all
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub filter: Option<TimeFilter>,
    /// First day of a custom range (YYYY-MM-DD)
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,
    /// Last day of a custom range, inclusive (YYYY-MM-DD)
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,
    /// Label language: pt-br or en-us
    #[arg(long)]
    pub locale: Option<LabelLocale>,
    /// Offset from UTC, in minutes, used for labels and custom dates
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset: Option<i32>,
    /// Print the snapshot as JSON instead of tables
    #[arg(long)]
    pub json: bool,
    /// Path to a TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Base URL of the REST backend (overrides `SENTINEL_API_URL`)
    #[arg(long)]
    pub api_url: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub filter: TimeFilter,
    pub fetch_window: TimeFilter,
    pub labels: LabelOptions,
    pub api_url: Option<String>,
}

/// Merges flags, the environment's API URL and the config file.
///
/// # Errors
///
/// Returns [`ConfigError`] for unknown filter tags, reversed date ranges
/// or an out-of-range UTC offset.
pub fn resolve(
    args: &ViewArgs,
    env_api_url: Option<String>,
    file: &CliConfig,
) -> Result<Settings, ConfigError> {
    let locale = args.locale.or(file.locale).unwrap_or_default();
    let offset_minutes = args.utc_offset.or(file.utc_offset_minutes).unwrap_or(0);
    let labels = LabelOptions::with_offset_minutes(locale, offset_minutes)
        .ok_or(ConfigError::Offset(offset_minutes))?;

    let filter = match (args.from, args.to, args.filter) {
        (Some(from), Some(to), _) => {
            TimeFilter::Custom(CustomRange::from_dates(from, to, labels.offset)?)
        }
        (_, _, Some(filter)) => filter,
        _ => match &file.default_filter {
            Some(tag) => tag.parse()?,
            None => TimeFilter::default(),
        },
    };

    let fetch_window = match &file.fetch_window {
        Some(tag) => tag.parse()?,
        None => TimeFilter::All,
    };

    Ok(Settings {
        filter,
        fetch_window,
        labels,
        api_url: args
            .api_url
            .clone()
            .or(env_api_url)
            .or_else(|| file.api_url.clone()),
    })
}
