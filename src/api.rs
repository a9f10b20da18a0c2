//! Login endpoint client.
//!
//! Thin HTTP wrapper for `POST /login`. The session service depends on the
//! [`LoginApi`] trait so tests can swap in a scripted implementation. Pure
//! parsing lives in `parse_response` for testability.

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced at the login network boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("login request failed: {0}")]
    Request(String),

    /// The endpoint answered with a non-success HTTP status.
    #[error("login rejected: status {status}")]
    Status { status: u16, body: String },

    /// The success body was not `{jwt, username}`.
    #[error("login response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Coarse classification used to pick the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Credentials were rejected (HTTP 401).
    Unauthorized,
    Other,
}

impl ApiError {
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Status { status: 401, .. } => FailureKind::Unauthorized,
            _ => FailureKind::Other,
        }
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Login request body.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: &str, password: &str) -> Self {
        Self { username: username.to_owned(), password: password.to_owned() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Opaque auth token.
    pub jwt: String,
    /// Canonical username as known to the server.
    pub username: String,
}

// =============================================================================
// TRAIT
// =============================================================================

#[async_trait::async_trait]
pub trait LoginApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpLoginApi {
    http: reqwest::Client,
    url: String,
}

impl HttpLoginApi {
    /// Build a client posting to `config.login_url()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &SessionConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, url: config.login_url() })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl LoginApi for HttpLoginApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let response = self
            .http
            .post(&self.url)
            .json(credentials)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // The status alone classifies the failure; a truncated body must not hide a 401.
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status: status.as_u16(), body });
        }

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        parse_response(&text)
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_response(json: &str) -> Result<LoginResponse, ApiError> {
    serde_json::from_str(json).map_err(|e| ApiError::Parse(e.to_string()))
}
