use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveDate};

use bodymap_core::error::CoreError;

/// Viewer configuration loaded from environment variables.
///
/// All fields have defaults suitable for running next to an exported
/// `logs.json`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// JSON file holding an array of log rows (default: `logs.json`).
    pub logs_path: PathBuf,
    /// Day the heatmap window is centered on. `None` follows the current
    /// instant.
    pub reference_day: Option<NaiveDate>,
    /// Seconds between re-reads of the log file; `0` disables polling.
    pub refresh_secs: u64,
    /// Pretty-print emitted JSON (default: `false`).
    pub pretty: bool,
}

impl ViewerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                  |
    /// |-------------------------|--------------------------|
    /// | `BODYMAP_LOGS_PATH`     | `logs.json`              |
    /// | `BODYMAP_REFERENCE_DAY` | today (local), or `now`  |
    /// | `BODYMAP_REFRESH_SECS`  | `0`                      |
    /// | `BODYMAP_PRETTY`        | `false`                  |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable
    /// lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let logs_path = lookup("BODYMAP_LOGS_PATH")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "logs.json".into())
            .into();

        let reference_day = match lookup("BODYMAP_REFERENCE_DAY") {
            None => Some(Local::now().date_naive()),
            Some(raw) => parse_reference_day(&raw)?,
        };

        let refresh_secs = match lookup("BODYMAP_REFRESH_SECS") {
            None => 0,
            Some(raw) => raw.trim().parse().map_err(|_| {
                CoreError::Validation(format!(
                    "BODYMAP_REFRESH_SECS must be a non-negative integer, got {raw:?}"
                ))
            })?,
        };

        let pretty = match lookup("BODYMAP_PRETTY") {
            None => false,
            Some(raw) => parse_flag("BODYMAP_PRETTY", &raw)?,
        };

        Ok(Self {
            logs_path,
            reference_day,
            refresh_secs,
            pretty,
        })
    }

    /// Polling period, if polling is enabled.
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_secs > 0).then(|| Duration::from_secs(self.refresh_secs))
    }
}

/// Parse a reference day: `YYYY-MM-DD`, `today`, or `now` (follow the clock).
pub fn parse_reference_day(raw: &str) -> Result<Option<NaiveDate>, CoreError> {
    match raw.trim() {
        "" | "today" => Ok(Some(Local::now().date_naive())),
        "now" => Ok(None),
        value => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                CoreError::Validation(format!(
                    "reference day must be YYYY-MM-DD, `today` or `now`, got {value:?}"
                ))
            }),
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, CoreError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(CoreError::Validation(format!(
            "{name} must be a boolean, got {other:?}"
        ))),
    }
}
