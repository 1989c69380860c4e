//! Client configuration parsed from environment variables.
//!
//! Variables:
//! - `ROOMBOOK_BASE_URL`: backend origin (default `http://localhost:8080`)
//! - `ROOMBOOK_STATE_FILE`: credential store path (default `.roombook/session.json`)
//! - `ROOMBOOK_REQUEST_TIMEOUT_SECS`: default 30
//! - `ROOMBOOK_CONNECT_TIMEOUT_SECS`: default 10

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;

pub const ENV_BASE_URL: &str = "ROOMBOOK_BASE_URL";
pub const ENV_STATE_FILE: &str = "ROOMBOOK_STATE_FILE";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "ROOMBOOK_REQUEST_TIMEOUT_SECS";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "ROOMBOOK_CONNECT_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_STATE_FILE: &str = ".roombook/session.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub state_file: PathBuf,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build typed config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the base URL is not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the base URL is not an http(s) URL.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = normalize_base_url(
            lookup(ENV_BASE_URL)
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL),
        )?;
        let state_file = lookup(ENV_STATE_FILE)
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STATE_FILE), PathBuf::from);
        let timeouts = Timeouts {
            request_secs: parse_secs(&lookup, ENV_REQUEST_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_secs(&lookup, ENV_CONNECT_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { base_url, state_file, timeouts })
    }

    /// Replace the base URL, e.g. from a command-line flag.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `raw` is not an http(s) URL.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(raw)?;
        Ok(self)
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            var: ENV_BASE_URL,
            reason: format!("expected an http(s) URL, got {raw:?}"),
        });
    }
    Ok(trimmed.to_owned())
}

/// Unparseable or zero values fall back to the default.
fn parse_secs<F>(lookup: &F, key: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(default)
}
