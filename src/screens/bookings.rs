//! Room search, booking and the "my bookings" list.

#[cfg(test)]
#[path = "bookings_test.rs"]
mod bookings_test;

use std::fmt::Write as _;

use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use super::{ScreenError, enter, failed, invalid, or_dash};
use crate::app::AppContext;
use crate::net::types::{Booking, BookingRequest, BookingStatus, Room, RoomRef};
use crate::routes::Route;
use crate::state::storage::CredentialStore;

const NO_ROOMS: &str = "No rooms available for the selected time.";
const PURPOSE_REQUIRED: &str = "Please enter a purpose for the booking";
const CONFIRM_CANCEL: &str = "Are you sure you want to cancel this booking?";

// =============================================================================
// TIME
// =============================================================================

/// Parse a local date-time as typed into the form (`yyyy-MM-ddTHH:mm`) or as
/// sent by the backend (with seconds, optionally fractional).
#[must_use]
pub fn parse_local_time(raw: &str) -> Option<PrimitiveDateTime> {
    let raw = raw.trim();
    let minutes = format_description!("[year]-[month]-[day]T[hour]:[minute]");
    let seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let fractional = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
    PrimitiveDateTime::parse(raw, minutes)
        .or_else(|_| PrimitiveDateTime::parse(raw, seconds))
        .or_else(|_| PrimitiveDateTime::parse(raw, fractional))
        .ok()
}

/// Normalize form input to the backend's `yyyy-MM-ddTHH:mm:ss`. Minute
/// precision input gains `:00`.
///
/// # Errors
///
/// Returns [`ScreenError::Invalid`] if the input is not a local date-time.
pub fn normalize_local_time(raw: &str) -> Result<String, ScreenError> {
    let out = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    parse_local_time(raw)
        .and_then(|t| t.format(out).ok())
        .ok_or_else(|| ScreenError::Invalid(format!("invalid date-time {raw:?}, expected yyyy-MM-ddTHH:mm")))
}

/// The current wall-clock time in the local zone, or UTC if the offset is unknown.
#[must_use]
pub fn local_now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    PrimitiveDateTime::new(now.date(), now.time())
}

// =============================================================================
// RULES
// =============================================================================

/// Build the create-booking body from raw form values.
///
/// # Errors
///
/// Returns [`ScreenError::Invalid`] for a blank purpose or malformed times.
pub fn booking_request(room_id: i64, start: &str, end: &str, purpose: &str) -> Result<BookingRequest, ScreenError> {
    let purpose = purpose.trim();
    if purpose.is_empty() {
        return Err(ScreenError::Invalid(PURPOSE_REQUIRED.to_owned()));
    }
    Ok(BookingRequest {
        room: RoomRef { id: room_id },
        start_time: normalize_local_time(start)?,
        end_time: normalize_local_time(end)?,
        purpose: purpose.to_owned(),
    })
}

/// A booking can be cancelled while it is not cancelled and has not started.
#[must_use]
pub fn can_cancel(booking: &Booking, now: PrimitiveDateTime) -> bool {
    if booking.status == Some(BookingStatus::Cancelled) {
        return false;
    }
    parse_local_time(&booking.start_time).is_some_and(|start| start > now)
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Rooms free for the whole window. An empty result is reported as info.
///
/// # Errors
///
/// Returns a [`ScreenError`] if the route is not admitted, the input is
/// malformed, or the search fails.
pub async fn search<S: CredentialStore>(app: &AppContext<S>, start: &str, end: &str) -> Result<Vec<Room>, ScreenError> {
    enter(app, &Route::BookRoom)?;
    let start = normalize_local_time(start).map_err(|e| invalid(app.notifier(), &e.to_string()))?;
    let end = normalize_local_time(end).map_err(|e| invalid(app.notifier(), &e.to_string()))?;

    let rooms = app
        .api()
        .available_rooms(&start, &end)
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to search rooms"))?;
    if rooms.is_empty() {
        app.notifier().info(NO_ROOMS);
    }
    tracing::debug!(%start, %end, count = rooms.len(), "room search");
    Ok(rooms)
}

/// Book `room_id` and move to the bookings list.
///
/// # Errors
///
/// Returns a [`ScreenError`] if the route is not admitted, the input is
/// invalid, or the backend refuses the booking.
pub async fn book<S: CredentialStore>(
    app: &AppContext<S>,
    room_id: i64,
    start: &str,
    end: &str,
    purpose: &str,
) -> Result<Booking, ScreenError> {
    enter(app, &Route::BookRoom)?;
    let request = booking_request(room_id, start, end, purpose).map_err(|e| invalid(app.notifier(), &e.to_string()))?;

    let booking = app
        .api()
        .create_booking(&request)
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to create booking"))?;
    tracing::info!(booking_id = booking.id, room_id, "booking created");
    app.notifier().success("Booking created successfully!");
    app.navigator().go(Route::MyBookings);
    Ok(booking)
}

/// # Errors
///
/// Returns a [`ScreenError`] if the route is not admitted or the fetch fails.
pub async fn mine<S: CredentialStore>(app: &AppContext<S>) -> Result<Vec<Booking>, ScreenError> {
    enter(app, &Route::MyBookings)?;
    app.api()
        .my_bookings()
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to fetch bookings"))
}

/// Cancel one of the caller's bookings. Requires `confirmed`.
///
/// # Errors
///
/// Returns [`ScreenError::Unconfirmed`] without `confirmed`,
/// [`ScreenError::Invalid`] for an unknown or no longer cancellable booking,
/// and [`ScreenError::Failed`] if the backend refuses.
pub async fn cancel<S: CredentialStore>(app: &AppContext<S>, id: i64, confirmed: bool) -> Result<(), ScreenError> {
    let bookings = mine(app).await?;
    let Some(booking) = bookings.iter().find(|b| b.id == id) else {
        return Err(invalid(app.notifier(), &format!("Booking {id} not found")));
    };
    if !can_cancel(booking, local_now()) {
        return Err(invalid(app.notifier(), &format!("Booking {id} can no longer be cancelled")));
    }
    if !confirmed {
        return Err(ScreenError::Unconfirmed(CONFIRM_CANCEL));
    }

    app.api()
        .cancel_booking(id)
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to cancel booking"))?;
    tracing::info!(booking_id = id, "booking cancelled");
    app.notifier().success("Booking cancelled successfully");
    Ok(())
}

// =============================================================================
// RENDER
// =============================================================================

#[must_use]
pub fn render_rooms(rooms: &[Room]) -> String {
    let mut out = String::new();
    for room in rooms {
        let _ = writeln!(
            out,
            "#{:<4} {:<8} {:<24} capacity {:<4} {}",
            room.id,
            or_dash(room.room_number.as_deref()),
            or_dash(room.name.as_deref()),
            room.capacity,
            or_dash(room.room_type.as_deref()),
        );
    }
    out
}

/// One line per booking; cancellable ones are marked relative to `now`.
#[must_use]
pub fn render_bookings(bookings: &[Booking], now: PrimitiveDateTime) -> String {
    let mut out = String::new();
    for booking in bookings {
        let room = booking.room_name.as_deref().or(booking.room_number.as_deref());
        let status = booking.status.map_or("UNKNOWN", BookingStatus::as_str);
        let marker = if can_cancel(booking, now) { "  [cancellable]" } else { "" };
        let _ = writeln!(
            out,
            "#{:<4} {:<20} {} - {}  {:<9} {}{marker}",
            booking.id,
            or_dash(room),
            booking.start_time,
            booking.end_time,
            status,
            or_dash(booking.purpose.as_deref()),
        );
    }
    out
}
