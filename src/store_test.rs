use super::*;
use crate::api::{ApiError, Credentials, LoginApi, LoginResponse};
use crate::toast::ToastService;

struct FixedApi;

#[async_trait::async_trait]
impl LoginApi for FixedApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        if credentials.password == "pw" {
            Ok(LoginResponse { jwt: "abc".into(), username: credentials.username.clone() })
        } else {
            Err(ApiError::Status { status: 401, body: String::new() })
        }
    }
}

/// Store inside a fresh temp dir; the dir is removed when the guard drops.
fn temp_store() -> (tempfile::TempDir, Arc<SessionStore>) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SessionStore::new(dir.path().join("session.json")));
    (dir, store)
}

fn service() -> LoginService {
    LoginService::new(Arc::new(FixedApi), Arc::new(ToastService::new()))
}

// =============================================================================
// load / save / clear
// =============================================================================

#[test]
fn missing_file_loads_empty() {
    let (_dir, store) = temp_store();
    assert_eq!(store.load().unwrap(), StoredSession::default());
}

#[test]
fn save_then_load() {
    let (_dir, store) = temp_store();
    let session = StoredSession { token: Some("abc".into()), user: Some("alice".into()) };
    store.save(&session).unwrap();
    assert_eq!(store.load().unwrap(), session);
}

#[test]
fn saving_empty_session_removes_file() {
    let (_dir, store) = temp_store();
    store.save(&StoredSession { token: Some("abc".into()), user: None }).unwrap();
    assert!(store.path().exists());

    store.save(&StoredSession::default()).unwrap();
    assert!(!store.path().exists());
}

#[test]
fn clear_missing_file_is_ok() {
    let (_dir, store) = temp_store();
    assert!(store.clear().is_ok());
}

#[test]
fn corrupt_file_is_json_error() {
    let (_dir, store) = temp_store();
    std::fs::write(store.path(), "{not json").unwrap();
    assert!(matches!(store.load(), Err(StoreError::Json(_))));
}

// =============================================================================
// restore / attach
// =============================================================================

#[test]
fn restore_publishes_stored_values() {
    let (_dir, store) = temp_store();
    store.save(&StoredSession { token: Some("abc".into()), user: Some("alice".into()) }).unwrap();

    let svc = service();
    let restored = store.restore_into(&svc).unwrap();

    assert_eq!(restored.user.as_deref(), Some("alice"));
    assert_eq!(svc.current_token(), Some("abc".into()));
    assert_eq!(svc.current_user(), Some("alice".into()));
}

#[test]
fn restore_from_missing_file_publishes_nothing() {
    let (_dir, store) = temp_store();
    let svc = service();
    store.restore_into(&svc).unwrap();
    assert_eq!(svc.token_observable().latest(), None);
    assert_eq!(svc.user_observable().latest(), None);
}

#[tokio::test]
async fn sign_in_is_persisted_and_sign_out_removes_file() {
    let (_dir, store) = temp_store();
    let svc = service();
    let _subs = store.attach(&svc);

    assert_eq!(svc.attempt_sign_in("alice", "pw").await, "alice");
    assert_eq!(
        store.load().unwrap(),
        StoredSession { token: Some("abc".into()), user: Some("alice".into()) }
    );

    svc.sign_out();
    assert!(!store.path().exists());
}

#[tokio::test]
async fn failed_sign_in_writes_nothing() {
    let (_dir, store) = temp_store();
    let svc = service();
    let _subs = store.attach(&svc);

    assert_eq!(svc.attempt_sign_in("alice", "nope").await, "");
    assert!(!store.path().exists());
}

#[test]
fn detached_store_stops_writing() {
    let (_dir, store) = temp_store();
    let svc = service();
    let subs = store.attach(&svc);
    drop(subs);

    svc.set_token(Some("abc".into()));
    assert!(!store.path().exists());
}

// =============================================================================
// update
// =============================================================================

#[test]
fn write_replaces_corrupt_file() {
    let (_dir, store) = temp_store();
    std::fs::write(store.path(), "{not json").unwrap();

    store.update(Field::Token, Some("abc")).unwrap();
    assert_eq!(store.load().unwrap(), StoredSession { token: Some("abc".into()), user: None });
}

#[test]
fn write_propagates_unreadable_file_error() {
    let (_dir, store) = temp_store();
    // A directory at the session path cannot be read as a file.
    std::fs::create_dir(store.path()).unwrap();

    let err = store.update(Field::Token, Some("abc")).unwrap_err();
    assert!(matches!(err, StoreError::Io(_)));
    assert!(store.path().is_dir());
}

#[test]
fn sequential_publishes_leave_file_matching_latest() {
    let (_dir, store) = temp_store();
    let svc = service();
    let _subs = store.attach(&svc);

    svc.set_token(Some("first".into()));
    svc.set_token(Some("second".into()));

    assert_eq!(store.load().unwrap().token, svc.current_token());
}
