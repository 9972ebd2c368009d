//! Process configuration read from the environment.
//!
//! | Variable | Required | Default |
//! |----------|----------|---------|
//! | `TWITTER_BEARER_TOKEN` | yes | |
//! | `GOOGLE_CLOUD_PROJECT` | yes | |
//! | `RUNTIMECONFIG_ACCESS_TOKEN` | yes | |
//! | `DM_RESHARE_CONFIG_NAME` | no | `prod` |
//! | `DM_RESHARE_STATE_DIR` | no | `state` |
//!
//! Polling settings are read by [`PollConfig::from_lookup`].

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::allowlist::DEFAULT_CONFIG_NAME;
use crate::worker::PollConfig;

/// Default directory for the watermark file.
const DEFAULT_STATE_DIR: &str = "state";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
}

/// Everything needed to build the bot's clients and poll loop.
#[derive(Clone, PartialEq, Eq)]
pub struct BotConfig {
    /// Bearer token for the Twitter API.
    pub twitter_token: String,

    /// Cloud project holding the allow-list config.
    pub project: String,

    /// OAuth access token for the Runtime Config API.
    pub runtime_config_token: String,

    /// Name of the Runtime Config config holding the allow-list.
    pub config_name: String,

    /// Directory holding `watermark.json`.
    pub state_dir: PathBuf,

    pub poll: PollConfig,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        Ok(BotConfig {
            twitter_token: required("TWITTER_BEARER_TOKEN")?,
            project: required("GOOGLE_CLOUD_PROJECT")?,
            runtime_config_token: required("RUNTIMECONFIG_ACCESS_TOKEN")?,
            config_name: get("DM_RESHARE_CONFIG_NAME")
                .unwrap_or_else(|| DEFAULT_CONFIG_NAME.to_string()),
            state_dir: get("DM_RESHARE_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR)),
            poll: PollConfig::from_lookup(&lookup),
        })
    }
}

// Tokens stay out of logs.
impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("twitter_token", &"<redacted>")
            .field("project", &self.project)
            .field("runtime_config_token", &"<redacted>")
            .field("config_name", &self.config_name)
            .field("state_dir", &self.state_dir)
            .field("poll", &self.poll)
            .finish()
    }
}
