//! Session service: sign-in, sign-out, and the observable session state.
//!
//! DESIGN
//! ======
//! The service owns two replay channels, one for the auth token and one for
//! the username, and is their only writer. Sign-in failures never reach the
//! caller as errors: each attempt shows exactly one toast and resolves to the
//! canonical username, or `""` when the attempt failed.
//!
//! TRADE-OFFS
//! ==========
//! Token and user are published one after the other, so an observer can see
//! one updated before the other. Overlapping sign-ins are not superseded;
//! whichever completes last wins.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::sync::Arc;

use crate::api::{Credentials, FailureKind, LoginApi};
use crate::replay::{Observable, ReplayChannel};
use crate::toast::Notifier;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username and password.";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unable to log you in, there was an unknown error.";

/// Value published to both channels on sign-out.
pub const SIGNED_OUT: &str = "";

/// Sign-in service and sole writer of the token and user channels.
///
/// Drive it from one task. Publishes from different threads can reach
/// listeners in a different order from the one `latest()` reflects, so an
/// observer such as the session store may end up holding an older value.
pub struct LoginService {
    api: Arc<dyn LoginApi>,
    notifier: Arc<dyn Notifier>,
    token: ReplayChannel<Option<String>>,
    user: ReplayChannel<Option<String>>,
}

impl LoginService {
    #[must_use]
    pub fn new(api: Arc<dyn LoginApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, notifier, token: ReplayChannel::new(), user: ReplayChannel::new() }
    }

    /// Attempt to sign in with the given credentials.
    ///
    /// Resolves to the canonical username on success and `""` on any failure.
    /// Exactly one notification is shown either way.
    pub async fn attempt_sign_in(&self, username: &str, password: &str) -> String {
        tracing::debug!(%username, "attempting sign-in");

        match self.api.login(&Credentials::new(username, password)).await {
            Ok(resp) => {
                self.token.publish(Some(resp.jwt));
                self.user.publish(Some(resp.username.clone()));
                self.notifier.show_message(&format!("Welcome back, {username}!"));
                resp.username
            }
            Err(e) => {
                tracing::warn!(error = %e, %username, "sign-in failed");
                match e.failure_kind() {
                    FailureKind::Unauthorized => self.notifier.show_error(INVALID_CREDENTIALS_MESSAGE),
                    FailureKind::Other => self.notifier.show_error(UNKNOWN_ERROR_MESSAGE),
                }
                String::new()
            }
        }
    }

    /// Publish the empty string to both channels.
    ///
    /// Observers treat `""` as the clear signal, e.g. the session store
    /// deletes its file.
    pub fn sign_out(&self) {
        self.token.publish(Some(SIGNED_OUT.to_owned()));
        self.user.publish(Some(SIGNED_OUT.to_owned()));
    }

    #[must_use]
    pub fn token_observable(&self) -> Observable<Option<String>> {
        self.token.observe()
    }

    #[must_use]
    pub fn user_observable(&self) -> Observable<Option<String>> {
        self.user.observe()
    }

    /// Publish a token directly, bypassing the login endpoint.
    pub fn set_token(&self, token: Option<String>) {
        self.token.publish(token);
    }

    /// Publish a username directly, bypassing the login endpoint.
    pub fn set_user(&self, user: Option<String>) {
        self.user.publish(user);
    }

    #[must_use]
    pub fn current_token(&self) -> Option<String> {
        self.token.latest().flatten()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<String> {
        self.user.latest().flatten()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.current_token().is_some_and(|t| !t.is_empty())
    }
}
