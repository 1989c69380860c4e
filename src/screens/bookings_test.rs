use time::macros::datetime;

use super::*;
use crate::app::OpenError;
use crate::config::Timeouts;
use crate::net::http::HttpBackend;
use crate::services::notify::Notifier;
use crate::state::storage::MemoryStorage;

fn booking(id: i64, start: &str, status: Option<BookingStatus>) -> Booking {
    Booking {
        id,
        room_id: Some(1),
        room_name: Some("Lab A".into()),
        room_number: Some("A-101".into()),
        lecturer_name: None,
        purpose: Some("Seminar".into()),
        start_time: start.into(),
        end_time: "2030-01-01T12:00:00".into(),
        status,
        created_at: None,
        updated_at: None,
    }
}

// =============================================================
// time handling
// =============================================================

#[test]
fn minute_input_gains_seconds() {
    assert_eq!(normalize_local_time("2025-03-04T09:30").unwrap(), "2025-03-04T09:30:00");
}

#[test]
fn second_input_is_kept() {
    assert_eq!(normalize_local_time(" 2025-03-04T09:30:15 ").unwrap(), "2025-03-04T09:30:15");
}

#[test]
fn malformed_input_is_invalid() {
    assert!(matches!(normalize_local_time("tomorrow"), Err(ScreenError::Invalid(_))));
    assert!(matches!(normalize_local_time("2025-13-01T10:00"), Err(ScreenError::Invalid(_))));
}

#[test]
fn backend_fractional_times_parse() {
    assert_eq!(
        parse_local_time("2025-03-04T09:30:00.123"),
        Some(datetime!(2025-03-04 09:30:00.123))
    );
}

// =============================================================
// booking_request
// =============================================================

#[test]
fn booking_request_normalizes_times_and_trims_purpose() {
    let request = booking_request(5, "2025-03-04T09:00", "2025-03-04T10:00", "  Lecture ").unwrap();
    assert_eq!(request.room.id, 5);
    assert_eq!(request.start_time, "2025-03-04T09:00:00");
    assert_eq!(request.end_time, "2025-03-04T10:00:00");
    assert_eq!(request.purpose, "Lecture");
}

#[test]
fn booking_request_requires_purpose() {
    let err = booking_request(5, "2025-03-04T09:00", "2025-03-04T10:00", "   ").unwrap_err();
    assert_eq!(err, ScreenError::Invalid("Please enter a purpose for the booking".into()));
}

// =============================================================
// can_cancel
// =============================================================

#[test]
fn future_confirmed_booking_is_cancellable() {
    let now = datetime!(2025-01-01 08:00);
    assert!(can_cancel(&booking(1, "2025-01-01T09:00:00", Some(BookingStatus::Confirmed)), now));
    assert!(can_cancel(&booking(2, "2025-01-01T09:00:00", None), now));
}

#[test]
fn cancelled_or_started_booking_is_not_cancellable() {
    let now = datetime!(2025-01-01 08:00);
    assert!(!can_cancel(&booking(1, "2025-01-01T09:00:00", Some(BookingStatus::Cancelled)), now));
    assert!(!can_cancel(&booking(2, "2025-01-01T08:00:00", Some(BookingStatus::Pending)), now));
    assert!(!can_cancel(&booking(3, "2024-12-31T23:00:00", Some(BookingStatus::Confirmed)), now));
}

#[test]
fn unparseable_start_is_not_cancellable() {
    assert!(!can_cancel(&booking(1, "soon", Some(BookingStatus::Pending)), datetime!(2025-01-01 0:00)));
}

// =============================================================
// render
// =============================================================

#[test]
fn render_bookings_marks_cancellable_rows() {
    let now = datetime!(2025-01-01 08:00);
    let out = render_bookings(
        &[
            booking(1, "2025-01-01T09:00:00", Some(BookingStatus::Confirmed)),
            booking(2, "2025-01-01T09:00:00", Some(BookingStatus::Cancelled)),
        ],
        now,
    );
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("#1"));
    assert!(lines[0].contains("Lab A"));
    assert!(lines[0].ends_with("[cancellable]"));
    assert!(lines[1].contains("CANCELLED"));
    assert!(!lines[1].contains("[cancellable]"));
}

#[test]
fn render_rooms_fills_missing_fields() {
    let room: Room = serde_json::from_value(serde_json::json!({"id": 3, "capacity": 40})).unwrap();
    let out = render_rooms(&[room]);
    assert!(out.starts_with("#3"));
    assert!(out.contains("capacity 40"));
    assert!(out.contains(" - "));
}

// =============================================================
// guarded operations
// =============================================================

fn anonymous_app() -> AppContext<MemoryStorage> {
    let backend = HttpBackend::new("http://127.0.0.1:9", Timeouts { request_secs: 2, connect_secs: 1 }).unwrap();
    AppContext::with_backend(backend, MemoryStorage::new(), Notifier::silent())
}

#[tokio::test]
async fn search_requires_login() {
    let app = anonymous_app();
    app.start().await;
    let err = search(&app, "2025-01-01T09:00", "2025-01-01T10:00").await.unwrap_err();
    assert_eq!(err, ScreenError::Open(OpenError::LoginRequired { requested: Route::BookRoom }));
}

#[tokio::test]
async fn cancel_requires_login() {
    let app = anonymous_app();
    app.start().await;
    let err = cancel(&app, 1, true).await.unwrap_err();
    assert_eq!(err, ScreenError::Open(OpenError::LoginRequired { requested: Route::MyBookings }));
}
