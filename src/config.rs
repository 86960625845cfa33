//! Runtime configuration sourced from the environment.
//!
//! Everything the run needs (credential, account, endpoint, output location)
//! is resolved once at startup into an [`AppConfig`] and passed explicitly to
//! the aggregator and the snapshot writer.

use crate::error::{Result, StatsError};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_USERNAME: &str = "sfedor2020";
pub const DEFAULT_OUTPUT_FILE: &str = "stats.json";
pub const DEFAULT_API_URL: &str = "https://api.github.com/graphql";

/// Raw environment variables, as read by `envy`.
#[derive(Debug, Deserialize)]
struct EnvVars {
    gh_pat: Option<String>,

    github_workspace: Option<PathBuf>,

    #[serde(default = "default_username")]
    stats_username: String,

    #[serde(default = "default_output_file")]
    stats_output_file: String,

    #[serde(default = "default_api_url")]
    stats_api_url: String,

    #[serde(default = "default_timeout_secs")]
    stats_request_timeout_secs: u64,
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

fn default_output_file() -> String {
    DEFAULT_OUTPUT_FILE.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Validated configuration for one run.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Bearer token for the GraphQL API.
    pub token: String,

    /// Account login whose statistics are collected.
    pub username: String,

    /// Directory the snapshot is written into. `None` means the current directory.
    pub output_dir: Option<PathBuf>,

    /// File name of the snapshot inside `output_dir`.
    pub output_file: String,

    pub api_url: String,

    /// Upper bound for a single HTTP call, connect through body.
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Fails with [`StatsError::MissingToken`] when `GH_PAT` is absent or blank,
    /// so callers can abort before any network traffic happens.
    pub fn from_env() -> Result<Self> {
        let vars: EnvVars = envy::from_env()?;
        Self::from_vars(vars)
    }

    fn from_vars(vars: EnvVars) -> Result<Self> {
        let token = vars
            .gh_pat
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(StatsError::MissingToken)?;

        Ok(Self {
            token,
            username: vars.stats_username,
            output_dir: vars.github_workspace.filter(|p| !p.as_os_str().is_empty()),
            output_file: vars.stats_output_file,
            api_url: vars.stats_api_url,
            request_timeout: Duration::from_secs(vars.stats_request_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const VARS: [&str; 6] = [
        "GH_PAT",
        "GITHUB_WORKSPACE",
        "STATS_USERNAME",
        "STATS_OUTPUT_FILE",
        "STATS_API_URL",
        "STATS_REQUEST_TIMEOUT_SECS",
    ];

    fn clear_vars() {
        for var in VARS {
            // SAFETY: tests touching the environment are serialized.
            unsafe { env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_vars();
        unsafe { env::set_var("GH_PAT", "ghp_test") };

        let config = AppConfig::from_env().expect("Failed to load config");

        assert_eq!(config.token, "ghp_test");
        assert_eq!(config.username, DEFAULT_USERNAME);
        assert_eq!(config.output_dir, None);
        assert_eq!(config.output_file, "stats.json");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));

        clear_vars();
    }

    #[test]
    #[serial]
    fn test_config_overrides() {
        clear_vars();
        unsafe {
            env::set_var("GH_PAT", "ghp_test");
            env::set_var("GITHUB_WORKSPACE", "/work/repo");
            env::set_var("STATS_USERNAME", "octocat");
            env::set_var("STATS_OUTPUT_FILE", "badge.json");
            env::set_var("STATS_API_URL", "http://localhost:9000/graphql");
            env::set_var("STATS_REQUEST_TIMEOUT_SECS", "5");
        }

        let config = AppConfig::from_env().expect("Failed to load config");

        assert_eq!(config.username, "octocat");
        assert_eq!(config.output_dir, Some(PathBuf::from("/work/repo")));
        assert_eq!(config.output_file, "badge.json");
        assert_eq!(config.api_url, "http://localhost:9000/graphql");
        assert_eq!(config.request_timeout, Duration::from_secs(5));

        clear_vars();
    }

    #[test]
    #[serial]
    fn test_config_missing_token() {
        clear_vars();
        let result = AppConfig::from_env();
        assert!(matches!(result, Err(StatsError::MissingToken)));
    }

    #[test]
    #[serial]
    fn test_config_blank_token_is_missing() {
        clear_vars();
        unsafe { env::set_var("GH_PAT", "   ") };
        let result = AppConfig::from_env();
        assert!(matches!(result, Err(StatsError::MissingToken)));
        clear_vars();
    }

    #[test]
    #[serial]
    fn test_config_bad_timeout() {
        clear_vars();
        unsafe {
            env::set_var("GH_PAT", "ghp_test");
            env::set_var("STATS_REQUEST_TIMEOUT_SECS", "soon");
        }
        let result = AppConfig::from_env();
        assert!(matches!(result, Err(StatsError::Config(_))));
        clear_vars();
    }
}
