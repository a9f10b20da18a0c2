//! Application composition root.
//!
//! DESIGN
//! ======
//! `App` is built once at startup and owns every long-lived service: the
//! HTTP login client, the toast service, the session service, and the
//! session store's subscriptions. Components receive these by reference
//! from the `App` instead of reaching for globals.

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;

use std::sync::Arc;

use crate::api::{ApiError, HttpLoginApi, LoginApi};
use crate::config::SessionConfig;
use crate::replay::Subscription;
use crate::session::LoginService;
use crate::store::{SessionStore, StoreError};
use crate::toast::ToastService;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct App {
    config: SessionConfig,
    toasts: Arc<ToastService>,
    session: Arc<LoginService>,
    store: Arc<SessionStore>,
    _persistence: Vec<Subscription>,
}

impl App {
    /// Build the application against the HTTP login endpoint in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build or the session file
    /// cannot be read.
    pub fn bootstrap(config: SessionConfig) -> Result<Self, AppError> {
        let api = HttpLoginApi::new(&config)?;
        tracing::debug!(url = api.url(), "login endpoint configured");
        Self::with_api(config, Arc::new(api))
    }

    /// Build the application with a caller-supplied login transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be read or removed. A file
    /// that is not valid JSON is discarded and the app starts signed out.
    pub fn with_api(config: SessionConfig, api: Arc<dyn LoginApi>) -> Result<Self, AppError> {
        let toasts = Arc::new(ToastService::new());
        let session = Arc::new(LoginService::new(api, toasts.clone()));
        let store = Arc::new(SessionStore::new(config.session_file.clone()));

        match store.restore_into(&session) {
            Ok(_) => {}
            Err(StoreError::Json(e)) => {
                tracing::warn!(error = %e, path = %store.path().display(), "discarding unreadable session file");
                store.clear()?;
            }
            Err(e) => return Err(e.into()),
        }
        let persistence = store.attach(&session);

        Ok(Self { config, toasts, session, store, _persistence: persistence })
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &Arc<LoginService> {
        &self.session
    }

    #[must_use]
    pub fn toasts(&self) -> &Arc<ToastService> {
        &self.toasts
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }
}
