use super::*;
use crate::api::{Credentials, LoginResponse};
use crate::session::INVALID_CREDENTIALS_MESSAGE;
use crate::store::StoredSession;
use crate::toast::ToastKind;

struct RejectAll;

#[async_trait::async_trait]
impl LoginApi for RejectAll {
    async fn login(&self, _credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        Err(ApiError::Status { status: 401, body: "nope".into() })
    }
}

/// Config whose session file lives in a temp dir removed when the guard drops.
fn temp_config() -> (tempfile::TempDir, SessionConfig) {
    let dir = tempfile::tempdir().unwrap();
    let config = SessionConfig { session_file: dir.path().join("session.json"), ..SessionConfig::default() };
    (dir, config)
}

#[test]
fn bootstrap_builds_http_app_with_empty_session() {
    let (_dir, config) = temp_config();
    let app = App::bootstrap(config).unwrap();
    assert!(!app.session().is_signed_in());
    assert!(app.toasts().history().is_empty());
    assert_eq!(app.config().login_path, "/login");
}

#[test]
fn bootstrap_restores_stored_session() {
    let (_dir, config) = temp_config();
    let store = SessionStore::new(config.session_file.clone());
    store.save(&StoredSession { token: Some("abc".into()), user: Some("alice".into()) }).unwrap();

    let app = App::bootstrap(config).unwrap();

    assert!(app.session().is_signed_in());
    assert_eq!(app.session().current_user(), Some("alice".into()));
}

#[tokio::test]
async fn rejected_sign_in_surfaces_error_toast() {
    let (_dir, config) = temp_config();
    let app = App::with_api(config, Arc::new(RejectAll)).unwrap();

    assert_eq!(app.session().attempt_sign_in("alice", "pw").await, "");

    let history = app.toasts().history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, ToastKind::Error);
    assert_eq!(history[0].text, INVALID_CREDENTIALS_MESSAGE);
    assert!(!app.store().path().exists());
}

#[test]
fn sign_out_clears_restored_session_file() {
    let (_dir, config) = temp_config();
    SessionStore::new(config.session_file.clone())
        .save(&StoredSession { token: Some("abc".into()), user: Some("alice".into()) })
        .unwrap();

    let app = App::with_api(config, Arc::new(RejectAll)).unwrap();
    app.session().sign_out();

    assert!(!app.store().path().exists());
}

#[test]
fn corrupt_session_file_is_discarded_at_startup() {
    let (_dir, config) = temp_config();
    std::fs::write(&config.session_file, "{not json").unwrap();

    let app = App::bootstrap(config).unwrap();

    assert!(!app.session().is_signed_in());
    assert_eq!(app.session().token_observable().latest(), None);
    assert!(!app.store().path().exists());

    app.session().sign_out();
    assert!(!app.store().path().exists());
}

#[test]
fn unreadable_session_path_fails_bootstrap() {
    let (_dir, config) = temp_config();
    std::fs::create_dir(&config.session_file).unwrap();

    let err = App::with_api(config, Arc::new(RejectAll)).err().unwrap();
    assert!(matches!(err, AppError::Store(StoreError::Io(_))));
}
