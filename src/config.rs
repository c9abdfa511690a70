//! Process settings resolved from the environment.
//!
//! Settings::from_env -> Settings { config_dir, api_base, poll_interval, workflow_timeout }
//! Env overrides: XDG_CONFIG_HOME, LINKED_API_URL, LINKEDIN_CLI_POLL_MS, LINKEDIN_CLI_TIMEOUT_MS.
//! Unparsable or zero overrides fall back to the defaults.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const APP_DIR_NAME: &str = "linkedin-cli";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_API_BASE: &str = "https://api.linkedapi.io";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_WORKFLOW_TIMEOUT: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding `config.json`.
    pub config_dir: PathBuf,
    /// Root of the remote API.
    pub api_base: Url,
    /// Delay between workflow status checks while waiting for a result.
    pub poll_interval: Duration,
    /// Upper bound on a single result wait before a timeout error is raised.
    pub workflow_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            config_dir: config_dir()?,
            api_base: api_base()?,
            poll_interval: parse_duration_ms("LINKEDIN_CLI_POLL_MS")
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            workflow_timeout: parse_duration_ms("LINKEDIN_CLI_TIMEOUT_MS")
                .unwrap_or(DEFAULT_WORKFLOW_TIMEOUT),
        })
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }
}

/// `$XDG_CONFIG_HOME/linkedin-cli`, else `~/.config/linkedin-cli` on every platform.
pub fn config_dir() -> Result<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(xdg).join(APP_DIR_NAME));
    }
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join(APP_DIR_NAME))
}

fn api_base() -> Result<Url> {
    let from_env = std::env::var("LINKED_API_URL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .and_then(|raw| match Url::parse(raw.trim()) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!("ignoring invalid LINKED_API_URL '{raw}': {e}");
                None
            }
        });
    match from_env {
        Some(url) => Ok(url),
        None => default_api_base(),
    }
}

fn default_api_base() -> Result<Url> {
    Url::parse(DEFAULT_API_BASE).context("invalid built-in API base URL")
}

fn parse_duration_ms(var: &str) -> Option<Duration> {
    let raw = std::env::var(var).ok()?;
    let parsed = duration_from_ms(&raw);
    if parsed.is_none() {
        tracing::warn!("ignoring invalid {var}='{raw}'");
    }
    parsed
}

/// Positive whole milliseconds; zero is rejected like any unparsable value.
fn duration_from_ms(raw: &str) -> Option<Duration> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_is_https() {
        let url = default_api_base().unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("api.linkedapi.io"));
    }

    #[test]
    fn config_path_appends_file_name() {
        let settings = Settings {
            config_dir: PathBuf::from("/tmp/x"),
            api_base: default_api_base().unwrap(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            workflow_timeout: DEFAULT_WORKFLOW_TIMEOUT,
        };
        assert_eq!(settings.config_path(), PathBuf::from("/tmp/x/config.json"));
    }

    #[test]
    fn missing_duration_var_is_none() {
        assert_eq!(parse_duration_ms("LINKEDIN_CLI_SURELY_UNSET_VAR"), None);
    }

    #[test]
    fn zero_and_garbage_durations_are_rejected() {
        assert_eq!(duration_from_ms("0"), None);
        assert_eq!(duration_from_ms(" 00 "), None);
        assert_eq!(duration_from_ms("-5"), None);
        assert_eq!(duration_from_ms("fast"), None);
        assert_eq!(duration_from_ms(" 250 "), Some(Duration::from_millis(250)));
    }
}
