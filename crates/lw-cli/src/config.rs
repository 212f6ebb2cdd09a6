//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use lw_core::EstimateConfig;
use lw_jira::JiraClient;
use serde::{Deserialize, Serialize};

/// Supported ticket trackers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerKind {
    #[default]
    Jira,
}

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    pub tracker: TrackerKind,

    /// Base URL of the tracker, e.g. `https://example.atlassian.net`.
    pub endpoint: Option<String>,

    pub username: Option<String>,

    pub api_token: Option<String>,

    /// Shortest word used as a search keyword, in characters.
    pub min_keyword_len: usize,

    /// Minimum combined score for copying an estimate.
    pub accept_threshold: f64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("tracker", &self.tracker)
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("min_keyword_len", &self.min_keyword_len)
            .field("accept_threshold", &self.accept_threshold)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let estimate = EstimateConfig::default();
        Self {
            tracker: TrackerKind::default(),
            endpoint: None,
            username: None,
            api_token: None,
            min_keyword_len: estimate.min_keyword_len,
            accept_threshold: estimate.accept_threshold,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // LW_ENDPOINT, LW_API_TOKEN, ...
        figment = figment.merge(Env::prefixed("LW_"));

        figment.extract()
    }

    /// Inference settings with the configured overrides applied.
    pub fn estimate_config(&self) -> EstimateConfig {
        EstimateConfig {
            min_keyword_len: self.min_keyword_len,
            accept_threshold: self.accept_threshold,
            ..EstimateConfig::default()
        }
    }

    /// Builds the tracker client from the configured endpoint and credentials.
    pub fn jira_client(&self) -> Result<JiraClient> {
        let endpoint = required(self.endpoint.as_deref(), "endpoint", "LW_ENDPOINT")?;
        let username = required(self.username.as_deref(), "username", "LW_USERNAME")?;
        let api_token = required(self.api_token.as_deref(), "API token", "LW_API_TOKEN")?;
        JiraClient::new(endpoint, username, api_token).context("failed to create Jira client")
    }
}

fn required<'a>(value: Option<&'a str>, name: &str, env: &str) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| anyhow::anyhow!("missing Jira {name} (set {env} or config.toml)"))
}

/// Returns the platform-specific config directory for lw.
///
/// On Linux: `~/.config/lw`
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lw"))
}
