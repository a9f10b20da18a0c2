//! On-disk persistence of the session.
//!
//! DESIGN
//! ======
//! The store is an ordinary observer of the session channels, the same way a
//! cookie writer would be: non-empty values are written through, while the
//! empty string (the sign-out marker) or absence clears the field. Once both
//! fields are clear the file is removed. At startup the stored values are
//! replayed into the service through `set_token` / `set_user`.

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::replay::Subscription;
use crate::session::LoginService;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl StoredSession {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none()
    }
}

#[derive(Clone, Copy)]
enum Field {
    Token,
    User,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session. A missing file loads as an empty session.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<StoredSession, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoredSession::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write `session`, or remove the file when `session` is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or removed.
    pub fn save(&self, session: &StoredSession) -> Result<(), StoreError> {
        if session.is_empty() {
            return self.clear();
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Remove the session file. Removing a missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// Replay the stored session into `service`. Returns what was restored.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored session cannot be loaded.
    pub fn restore_into(&self, service: &LoginService) -> Result<StoredSession, StoreError> {
        let stored = self.load()?;
        if let Some(token) = &stored.token {
            service.set_token(Some(token.clone()));
        }
        if let Some(user) = &stored.user {
            service.set_user(Some(user.clone()));
        }
        if !stored.is_empty() {
            tracing::debug!(path = %self.path.display(), user = ?stored.user, "restored session");
        }
        Ok(stored)
    }

    /// Write session changes from `service` through to disk until the
    /// returned subscriptions are dropped.
    pub fn attach(self: &Arc<Self>, service: &LoginService) -> Vec<Subscription> {
        let token_store = Arc::clone(self);
        let user_store = Arc::clone(self);
        vec![
            service.token_observable().subscribe(move |v| token_store.write_field(Field::Token, v.as_deref())),
            service.user_observable().subscribe(move |v| user_store.write_field(Field::User, v.as_deref())),
        ]
    }

    fn write_field(&self, field: Field, value: Option<&str>) {
        if let Err(e) = self.update(field, value) {
            tracing::error!(error = %e, path = %self.path.display(), "session store write failed");
        }
    }

    fn update(&self, field: Field, value: Option<&str>) -> Result<(), StoreError> {
        let mut stored = match self.load() {
            Ok(stored) => stored,
            // Unparseable content is replaced; anything else must not be overwritten.
            Err(StoreError::Json(_)) => StoredSession::default(),
            Err(e) => return Err(e),
        };
        let value = value.filter(|v| !v.is_empty()).map(str::to_owned);
        let slot = match field {
            Field::Token => &mut stored.token,
            Field::User => &mut stored.user,
        };
        if *slot == value {
            return Ok(());
        }
        *slot = value;
        self.save(&stored)
    }
}
