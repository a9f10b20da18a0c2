//! Session client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_SESSION_FILE: &str = ".flink-session.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL '{0}': expected an http:// or https:// URL")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub base_url: String,
    pub login_path: String,
    pub session_file: PathBuf,
    pub timeouts: HttpTimeouts,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            timeouts: HttpTimeouts::default(),
        }
    }
}

impl SessionConfig {
    /// Build typed config from environment variables.
    ///
    /// - `FLINK_BASE_URL`: server origin, default `http://127.0.0.1:8080`
    /// - `FLINK_LOGIN_PATH`: default `/login`
    /// - `FLINK_SESSION_FILE`: default `.flink-session.json`
    /// - `FLINK_REQUEST_TIMEOUT_SECS`: default 30
    /// - `FLINK_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SessionConfig::from_env`] with an explicit variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an http(s) URL.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(&lookup("FLINK_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()))?;
        let login_path = normalize_path(&lookup("FLINK_LOGIN_PATH").unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_owned()));
        let session_file = lookup("FLINK_SESSION_FILE")
            .filter(|s| !s.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from);
        let timeouts = HttpTimeouts {
            request_secs: parse_u64(lookup("FLINK_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(lookup("FLINK_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { base_url, login_path, session_file, timeouts })
    }

    /// Replace the base URL, applying the same validation as `from_env`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an http(s) URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(base_url)?;
        Ok(self)
    }

    #[must_use]
    pub fn login_url(&self) -> String {
        format!("{}{}", self.base_url, self.login_path)
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_host = ["http://", "https://"]
        .iter()
        .any(|scheme| trimmed.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()));
    if !has_host {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('/') { trimmed.to_owned() } else { format!("/{trimmed}") }
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.parse::<u64>().ok()).unwrap_or(default)
}
