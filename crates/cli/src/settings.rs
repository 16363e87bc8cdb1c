//! Layered configuration: defaults < config file < DEALHUB_* environment

use config::{Config, ConfigError, Environment, File};
use dealhub_core::application::constants::{
    DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT, DEFAULT_TRANSPORT_RETRIES,
};
use dealhub_core::application::{PollOptions, TransportRetryPolicy};
use dealhub_core::domain::StatusVocabulary;
use dealhub_sdk::DEFAULT_API_URL;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "DEALHUB";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api_url: String,
    #[serde(default)]
    pub token: Option<String>,
    pub poll_interval_ms: u64,
    pub poll_timeout_ms: u64,
    pub transport_retries: u32,
    /// Status tokens treated as success on top of the built-in set
    #[serde(default)]
    pub extra_success_statuses: Vec<String>,
    #[serde(default)]
    pub extra_failure_statuses: Vec<String>,
}

impl Settings {
    /// Load settings. `explicit` must exist when given; the per-user file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("poll_interval_ms", DEFAULT_POLL_INTERVAL.as_millis() as i64)?
            .set_default("poll_timeout_ms", DEFAULT_POLL_TIMEOUT.as_millis() as i64)?
            .set_default("transport_retries", i64::from(DEFAULT_TRANSPORT_RETRIES))?;

        if let Some(path) = user_config_path() {
            builder = builder.add_source(File::from(path).required(false));
        }
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("extra_success_statuses")
                    .with_list_parse_key("extra_failure_statuses"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn vocabulary(&self) -> StatusVocabulary {
        let vocabulary = self
            .extra_success_statuses
            .iter()
            .fold(StatusVocabulary::default(), |v, token| v.with_success(token));
        self.extra_failure_statuses
            .iter()
            .fold(vocabulary, |v, token| v.with_failure(token))
    }

    pub fn retry_policy(&self) -> TransportRetryPolicy {
        TransportRetryPolicy::bounded(self.transport_retries)
    }

    /// Poll options from config, with per-command overrides
    pub fn poll_options(&self, interval_ms: Option<u64>, timeout_ms: Option<u64>) -> PollOptions {
        PollOptions::new()
            .interval(Duration::from_millis(
                interval_ms.unwrap_or(self.poll_interval_ms),
            ))
            .timeout(Duration::from_millis(
                timeout_ms.unwrap_or(self.poll_timeout_ms),
            ))
    }
}

/// ~/.config/dealhub/config.toml (platform equivalent elsewhere)
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "dealhub", "dealhub")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
