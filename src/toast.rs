//! Toast notifications shown to the user.
//!
//! DESIGN
//! ======
//! Callers only see the fire-and-forget [`Notifier`] trait. The default
//! [`ToastService`] logs each toast, keeps a bounded in-memory history, and
//! broadcasts the newest toast on a replay channel so a UI layer can render
//! whatever was shown last.

#[cfg(test)]
#[path = "toast_test.rs"]
mod tests;

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crate::replay::{Observable, ReplayChannel};

/// Number of toasts `ToastService` retains; older ones are evicted first.
pub const HISTORY_LIMIT: usize = 50;

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync {
    fn show_message(&self, text: &str);
    fn show_error(&self, text: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Message,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub text: String,
}

// =============================================================================
// TOAST SERVICE
// =============================================================================

#[derive(Default)]
pub struct ToastService {
    history: Mutex<VecDeque<Toast>>,
    latest: ReplayChannel<Toast>,
}

impl ToastService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last [`HISTORY_LIMIT`] toasts, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Toast> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Stream of toasts; new subscribers receive the most recent one.
    #[must_use]
    pub fn toasts(&self) -> Observable<Toast> {
        self.latest.observe()
    }

    fn push(&self, kind: ToastKind, text: &str) {
        let toast = Toast { kind, text: text.to_owned() };
        {
            let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
            if history.len() == HISTORY_LIMIT {
                history.pop_front();
            }
            history.push_back(toast.clone());
        }
        self.latest.publish(toast);
    }
}

impl Notifier for ToastService {
    fn show_message(&self, text: &str) {
        tracing::info!(toast = %text, "toast");
        self.push(ToastKind::Message, text);
    }

    fn show_error(&self, text: &str) {
        tracing::warn!(toast = %text, "error toast");
        self.push(ToastKind::Error, text);
    }
}
