use super::*;
use crate::config::Timeouts;
use crate::services::notify;
use crate::state::storage::{MemoryStorage, TOKEN_KEY};

/// Nothing listens on the discard port, so any request fails fast.
fn context(storage: MemoryStorage) -> AppContext<MemoryStorage> {
    let backend = HttpBackend::new("http://127.0.0.1:9", Timeouts { request_secs: 2, connect_secs: 1 }).unwrap();
    AppContext::with_backend(backend, storage, Notifier::silent())
}

#[tokio::test]
async fn start_without_token_lands_on_login() {
    let app = context(MemoryStorage::new());
    assert_eq!(app.open("/profile"), Err(OpenError::Pending));

    let decision = app.start().await;

    assert_eq!(decision, Admission::RedirectToLogin { from: Some(Route::Profile) });
    assert_eq!(app.navigator().current().route, Route::Login);
    assert!(!app.session().current().is_loading);
}

#[tokio::test]
async fn start_with_unreachable_backend_clears_token() {
    let app = context(MemoryStorage::with_token("stale"));

    app.start().await;

    assert!(app.auth().token().is_none());
    assert!(app.session().current().identity.is_none());
}

#[tokio::test]
async fn open_reports_guard_outcome() {
    let app = context(MemoryStorage::new());
    app.start().await;

    assert_eq!(app.open("/login"), Ok(Route::Login));
    assert_eq!(app.open("/register"), Ok(Route::Register));
    assert_eq!(
        app.open("/admin/users"),
        Err(OpenError::LoginRequired { requested: Route::AdminUsers })
    );
}

#[tokio::test]
async fn logout_through_context_moves_navigator() {
    let (notifier, mut rx) = notify::channel();
    let backend = HttpBackend::new("http://127.0.0.1:9", Timeouts::default()).unwrap();
    let app = AppContext::with_backend(backend, MemoryStorage::with_token("t"), notifier);

    app.auth().logout();

    assert_eq!(app.navigator().current().route, Route::Login);
    assert_eq!(rx.try_recv().unwrap().message, "Logged out");
    assert!(app.auth().token().is_none());
}

#[test]
fn api_carries_current_token() {
    let storage = MemoryStorage::new();
    storage.set(TOKEN_KEY, "jwt").unwrap();
    let app = context(storage);
    assert_eq!(app.api().token(), Some("jwt"));
}

#[test]
fn open_error_messages_name_routes() {
    let err = OpenError::Redirected { requested: Route::AdminRooms, landed: Route::Dashboard };
    assert_eq!(err.to_string(), "/admin/rooms is not available; redirected to /dashboard");
}
