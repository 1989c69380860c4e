//! End-to-end tests against an in-process stub of the booking backend.

use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};

use roombook::app::{AppContext, OpenError};
use roombook::config::Timeouts;
use roombook::net::http::HttpBackend;
use roombook::net::types::{RegisterRequest, Role};
use roombook::routes::Route;
use roombook::screens::{self, ScreenError};
use roombook::services::auth::AuthError;
use roombook::services::notify::{self, Notification, NotificationLevel};
use roombook::state::storage::{CredentialStore, MemoryStorage, TOKEN_KEY};
use tokio::sync::mpsc::UnboundedReceiver;

// =============================================================================
// STUB BACKEND
// =============================================================================

fn failure(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "Status": 0, "Data": "", "Message": message })))
}

fn success(data: Value) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "Status": 1, "Data": data, "Message": "ok" })))
}

fn user_for_token(headers: &HeaderMap) -> Option<Value> {
    let auth = headers.get("authorization")?.to_str().ok()?;
    match auth {
        "Bearer jwt-alice" => Some(json!({
            "id": 1, "username": "alice", "fullName": "Alice Liddell",
            "email": "alice@example.edu", "role": "STUDENT", "points": 40
        })),
        "Bearer jwt-root" => Some(json!({ "id": 2, "username": "root", "role": "ROLE_ADMIN" })),
        _ => None,
    }
}

/// A misbehaving profile endpoint that skips the envelope for one token.
fn bare_user(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "Bearer jwt-bare")
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let username = body["username"].as_str().unwrap_or_default();
    match (username, body["password"].as_str()) {
        ("alice", Some("secret")) => {
            success(json!({ "token": "jwt-alice", "username": "alice", "role": "ROLE_STUDENT" }))
        }
        ("root", Some("secret")) => {
            success(json!({ "token": "jwt-root", "username": "root", "role": "ROLE_ADMIN" }))
        }
        _ => failure(StatusCode::UNAUTHORIZED, "Invalid username or password"),
    }
}

async fn me(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if bare_user(&headers) {
        return (StatusCode::OK, Json(json!({ "username": "mallory", "role": "ADMIN" })));
    }
    match user_for_token(&headers) {
        Some(user) => success(user),
        None => failure(StatusCode::UNAUTHORIZED, "Unauthorized"),
    }
}

/// Echoes the query window back as the room name so tests can inspect it.
async fn available(Query(query): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    let start = query.get("startTime").cloned().unwrap_or_default();
    if start.starts_with("2031") {
        return success(json!([]));
    }
    success(json!([{ "id": 9, "roomNumber": "B-9", "name": start, "capacity": 30 }]))
}

async fn my_bookings(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if user_for_token(&headers).is_none() {
        return failure(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    success(json!([
        { "id": 1, "roomName": "Lab A", "purpose": "Seminar", "startTime": "2099-01-01T09:00:00",
          "endTime": "2099-01-01T10:00:00", "status": "CONFIRMED" },
        { "id": 2, "roomName": "Lab B", "purpose": "Review", "startTime": "2099-01-02T09:00:00",
          "endTime": "2099-01-02T10:00:00", "status": "CANCELLED" },
        { "id": 3, "roomName": "Lab C", "purpose": "Exam", "startTime": "2099-01-03T09:00:00",
          "endTime": "2099-01-03T10:00:00", "status": "PENDING" }
    ]))
}

/// Bare booking on success, empty 400 otherwise.
async fn cancel(Path(id): Path<i64>) -> (StatusCode, String) {
    if id == 1 {
        let body = json!({ "id": 1, "startTime": "2099-01-01T09:00:00", "endTime": "2099-01-01T10:00:00",
                           "status": "CANCELLED" });
        (StatusCode::OK, body.to_string())
    } else {
        (StatusCode::BAD_REQUEST, String::new())
    }
}

/// Empty 200 with no envelope.
async fn register() -> StatusCode {
    StatusCode::OK
}

async fn stats() -> (StatusCode, Json<Value>) {
    success(json!({
        "totalBookingsEver": 12, "totalRoomsAvailable": 3, "totalActiveRooms": 4,
        "totalUpcomingBookings": 2, "totalActiveUsers": 9
    }))
}

async fn delete_room() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "Status": 1, "Data": null, "Message": "Room deleted" })))
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/users/me", get(me))
        .route("/api/users/register", post(register))
        .route("/api/rooms/available", get(available))
        .route("/api/rooms/{id}", delete(delete_room))
        .route("/api/bookings/my-bookings", get(my_bookings))
        .route("/api/bookings/{id}/cancel", put(cancel))
        .route("/api/admin/dashboard/stats", get(stats));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

// =============================================================================
// HELPERS
// =============================================================================

async fn app_with(storage: MemoryStorage) -> (AppContext<MemoryStorage>, UnboundedReceiver<Notification>) {
    let base_url = spawn_backend().await;
    let backend = HttpBackend::new(&base_url, Timeouts::default()).unwrap();
    let (notifier, rx) = notify::channel();
    let app = AppContext::with_backend(backend, storage, notifier);
    app.start().await;
    (app, rx)
}

async fn logged_in(username: &str) -> (AppContext<MemoryStorage>, UnboundedReceiver<Notification>) {
    let (app, mut rx) = app_with(MemoryStorage::new()).await;
    app.auth().login(username, "secret").await.unwrap();
    while rx.try_recv().is_ok() {}
    (app, rx)
}

fn drain(rx: &mut UnboundedReceiver<Notification>) -> Vec<Notification> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

// =============================================================================
// SESSION
// =============================================================================

#[tokio::test]
async fn login_persists_token_and_fetches_full_profile() {
    let (app, mut rx) = app_with(MemoryStorage::new()).await;
    app.navigator().navigate("/my-bookings");

    app.auth().login("alice", "secret").await.unwrap();
    app.navigator().return_after_login();

    let user = app.session().current().identity.unwrap();
    assert_eq!(user.full_name.as_deref(), Some("Alice Liddell"));
    assert_eq!(user.role, Role::Student);
    assert_eq!(app.auth().token().as_deref(), Some("jwt-alice"));
    assert_eq!(app.navigator().current().route, Route::MyBookings);
    assert_eq!(drain(&mut rx)[0].level, NotificationLevel::Success);
}

#[tokio::test]
async fn failed_login_surfaces_backend_message_from_401() {
    let (app, mut rx) = app_with(MemoryStorage::new()).await;

    let err = app.auth().login("alice", "nope").await.unwrap_err();

    assert_eq!(err, AuthError::Rejected("Invalid username or password".into()));
    assert!(app.auth().token().is_none());
    assert_eq!(drain(&mut rx)[0].message, "Invalid username or password");
}

#[tokio::test]
async fn bootstrap_restores_session_with_prefixed_role() {
    let (app, _rx) = app_with(MemoryStorage::with_token("jwt-root")).await;

    let session = app.session().current();
    assert_eq!(session.identity.unwrap().role, Role::Admin);
    assert_eq!(app.navigator().current().route, Route::AdminDashboard);
}

#[tokio::test]
async fn bootstrap_with_stale_token_clears_it() {
    let (app, mut rx) = app_with(MemoryStorage::with_token("expired")).await;

    assert!(app.session().current().identity.is_none());
    assert!(app.auth().token().is_none());
    assert_eq!(app.navigator().current().route, Route::Login);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn logout_then_protected_route_requires_login() {
    let (app, _rx) = logged_in("alice").await;

    app.auth().logout();

    assert_eq!(app.navigator().current().route, Route::Login);
    assert_eq!(
        app.open("/book-room"),
        Err(OpenError::LoginRequired { requested: Route::BookRoom })
    );
}

#[tokio::test]
async fn bootstrap_rejects_profile_without_envelope() {
    let (app, _rx) = app_with(MemoryStorage::with_token("jwt-bare")).await;

    assert!(app.session().current().identity.is_none());
    assert!(app.auth().token().is_none());
}

#[tokio::test]
async fn register_with_empty_ok_body_reports_failure() {
    let (app, mut rx) = app_with(MemoryStorage::new()).await;
    let request = RegisterRequest {
        username: "carol".into(),
        password: "pw".into(),
        email: "carol@example.edu".into(),
        role: Role::Lecturer,
        full_name: None,
        department: None,
    };

    let err = app.auth().register(&request).await.unwrap_err();

    assert_eq!(err, AuthError::Rejected("Registration failed".into()));
    assert_eq!(drain(&mut rx)[0].level, NotificationLevel::Error);
}

// =============================================================================
// SCREENS
// =============================================================================

#[tokio::test]
async fn search_sends_seconds_in_query() {
    let (app, _rx) = logged_in("alice").await;

    let rooms = screens::bookings::search(&app, "2030-05-01T09:00", "2030-05-01T10:00")
        .await
        .unwrap();

    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].name.as_deref(), Some("2030-05-01T09:00:00"));
}

#[tokio::test]
async fn empty_search_notifies_info() {
    let (app, mut rx) = logged_in("alice").await;

    let rooms = screens::bookings::search(&app, "2031-05-01T09:00", "2031-05-01T10:00")
        .await
        .unwrap();

    assert!(rooms.is_empty());
    assert_eq!(
        drain(&mut rx),
        vec![Notification {
            level: NotificationLevel::Info,
            message: "No rooms available for the selected time.".into()
        }]
    );
}

#[tokio::test]
async fn cancel_flow_honours_confirmation_and_status() {
    let (app, mut rx) = logged_in("alice").await;

    assert!(matches!(
        screens::bookings::cancel(&app, 1, false).await,
        Err(ScreenError::Unconfirmed(_))
    ));
    assert!(matches!(
        screens::bookings::cancel(&app, 2, true).await,
        Err(ScreenError::Invalid(_))
    ));
    drain(&mut rx);

    screens::bookings::cancel(&app, 1, true).await.unwrap();
    assert_eq!(drain(&mut rx)[0].message, "Booking cancelled successfully");

    let err = screens::bookings::cancel(&app, 3, true).await.unwrap_err();
    assert_eq!(err, ScreenError::Failed("Failed to cancel booking".into()));
}

#[tokio::test]
async fn student_is_redirected_away_from_admin_stats() {
    let (app, _rx) = logged_in("alice").await;

    let err = screens::admin::stats(&app).await.unwrap_err();

    assert_eq!(
        err,
        ScreenError::Open(OpenError::Redirected { requested: Route::AdminDashboard, landed: Route::Dashboard })
    );
}

#[tokio::test]
async fn admin_reads_stats_and_deletes_with_confirmation() {
    let (app, mut rx) = logged_in("root").await;

    let stats = screens::admin::stats(&app).await.unwrap();
    assert_eq!(stats.total_active_users, 9);

    assert!(matches!(
        screens::admin::delete_room(&app, 4, false).await,
        Err(ScreenError::Unconfirmed(_))
    ));
    screens::admin::delete_room(&app, 4, true).await.unwrap();
    assert_eq!(drain(&mut rx).last().unwrap().message, "Room deleted successfully");
}

#[tokio::test]
async fn persisted_token_is_readable_through_the_store_trait() {
    let storage = MemoryStorage::new();
    storage.set(TOKEN_KEY, "jwt-alice").unwrap();
    let (app, _rx) = app_with(storage).await;

    assert_eq!(app.session().current().identity.unwrap().username, "alice");
    assert_eq!(app.api().token(), Some("jwt-alice"));
}
