//! Admin screens: dashboard stats, rooms, equipment and users.
//!
//! Room and equipment forms send the caller's JSON object as-is; the backend
//! owns validation of those fields.

#[cfg(test)]
#[path = "admin_test.rs"]
mod admin_test;

use std::fmt::Write as _;

use serde_json::Value;

use super::{ScreenError, enter, failed, or_dash};
use crate::app::AppContext;
use crate::net::types::{Booking, DashboardStats, Equipment, Room, User};
use crate::routes::Route;
use crate::state::storage::CredentialStore;

fn confirm(confirmed: bool, prompt: &'static str) -> Result<(), ScreenError> {
    if confirmed { Ok(()) } else { Err(ScreenError::Unconfirmed(prompt)) }
}

// =============================================================================
// DASHBOARD
// =============================================================================

/// # Errors
///
/// Returns a [`ScreenError`] if the route is not admitted or the fetch fails.
pub async fn stats<S: CredentialStore>(app: &AppContext<S>) -> Result<DashboardStats, ScreenError> {
    enter(app, &Route::AdminDashboard)?;
    app.api()
        .dashboard_stats()
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to fetch dashboard stats"))
}

#[must_use]
pub fn render_stats(stats: &DashboardStats) -> String {
    format!(
        "Total bookings:     {}\nRooms available:    {}\nActive rooms:       {}\nUpcoming bookings:  {}\nActive users:       {}\n",
        stats.total_bookings_ever,
        stats.total_rooms_available,
        stats.total_active_rooms,
        stats.total_upcoming_bookings,
        stats.total_active_users,
    )
}

// =============================================================================
// ROOMS
// =============================================================================

/// # Errors
///
/// Returns a [`ScreenError`] if the route is not admitted or the fetch fails.
pub async fn rooms<S: CredentialStore>(app: &AppContext<S>) -> Result<Vec<Room>, ScreenError> {
    enter(app, &Route::AdminRooms)?;
    app.api()
        .rooms()
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to fetch rooms"))
}

/// Load a room into the edit form.
///
/// # Errors
///
/// Returns a [`ScreenError`] if the route is not admitted or the fetch fails;
/// on failure the navigator returns to the room list.
pub async fn room<S: CredentialStore>(app: &AppContext<S>, id: i64) -> Result<Room, ScreenError> {
    enter(app, &Route::AdminRoomEdit(id))?;
    match app.api().room(id).await {
        Ok(room) => Ok(room),
        Err(e) => {
            let err = failed(app.notifier(), e, "Failed to fetch room details");
            app.navigator().go(Route::AdminRooms);
            Err(err)
        }
    }
}

/// # Errors
///
/// Returns a [`ScreenError`] if the route is not admitted or the backend refuses.
pub async fn create_room<S: CredentialStore>(app: &AppContext<S>, form: &Value) -> Result<Room, ScreenError> {
    enter(app, &Route::AdminRoomNew)?;
    let room = app
        .api()
        .create_room(form)
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to create room"))?;
    app.notifier().success("Room created successfully");
    app.navigator().go(Route::AdminRooms);
    Ok(room)
}

/// # Errors
///
/// Returns a [`ScreenError`] if the route is not admitted or the backend refuses.
pub async fn update_room<S: CredentialStore>(app: &AppContext<S>, id: i64, form: &Value) -> Result<Room, ScreenError> {
    enter(app, &Route::AdminRoomEdit(id))?;
    let room = app
        .api()
        .update_room(id, form)
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to update room"))?;
    app.notifier().success("Room updated successfully");
    app.navigator().go(Route::AdminRooms);
    Ok(room)
}

/// # Errors
///
/// Returns [`ScreenError::Unconfirmed`] without `confirmed`, or a
/// [`ScreenError`] if the route is not admitted or the backend refuses.
pub async fn delete_room<S: CredentialStore>(app: &AppContext<S>, id: i64, confirmed: bool) -> Result<(), ScreenError> {
    enter(app, &Route::AdminRooms)?;
    confirm(confirmed, "Are you sure you want to delete this room?")?;
    app.api()
        .delete_room(id)
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to delete room"))?;
    tracing::info!(room_id = id, "room deleted");
    app.notifier().success("Room deleted successfully");
    Ok(())
}

/// # Errors
///
/// Returns a [`ScreenError`] if the route is not admitted or the backend refuses.
pub async fn set_room_status<S: CredentialStore>(app: &AppContext<S>, id: i64, status: &str) -> Result<(), ScreenError> {
    enter(app, &Route::AdminRooms)?;
    app.api()
        .set_room_status(id, status)
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to update room status"))?;
    app.notifier().success("Room status updated");
    Ok(())
}

/// # Errors
///
/// Returns a [`ScreenError`] if the route is not admitted or the fetch fails.
pub async fn room_schedule<S: CredentialStore>(
    app: &AppContext<S>,
    room_id: i64,
) -> Result<Vec<Booking>, ScreenError> {
    enter(app, &Route::AdminRooms)?;
    app.api()
        .upcoming_for_room(room_id)
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to fetch room bookings"))
}

// =============================================================================
// EQUIPMENT
// =============================================================================

/// # Errors
///
/// Returns a [`ScreenError`] if the route is not admitted or the fetch fails.
pub async fn equipment<S: CredentialStore>(app: &AppContext<S>) -> Result<Vec<Equipment>, ScreenError> {
    enter(app, &Route::AdminEquipment)?;
    app.api()
        .equipment()
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to fetch equipment"))
}

/// # Errors
///
/// Returns a [`ScreenError`] if the route is not admitted or the fetch fails.
pub async fn equipment_item<S: CredentialStore>(app: &AppContext<S>, id: i64) -> Result<Equipment, ScreenError> {
    enter(app, &Route::AdminEquipment)?;
    app.api()
        .equipment_item(id)
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to fetch equipment"))
}

/// Create (`id` absent) or update equipment from a form object.
///
/// # Errors
///
/// Returns a [`ScreenError`] if the route is not admitted or the backend refuses.
pub async fn save_equipment<S: CredentialStore>(
    app: &AppContext<S>,
    id: Option<i64>,
    form: &Value,
) -> Result<Equipment, ScreenError> {
    enter(app, &Route::AdminEquipment)?;
    let api = app.api();
    let saved = match id {
        Some(id) => api.update_equipment(id, form).await,
        None => api.create_equipment(form).await,
    };
    let verb = if id.is_some() { "update" } else { "create" };
    let item = saved.map_err(|e| failed(app.notifier(), e, &format!("Failed to {verb} equipment")))?;
    app.notifier().success(format!("Equipment {verb}d successfully"));
    Ok(item)
}

/// # Errors
///
/// Returns [`ScreenError::Unconfirmed`] without `confirmed`, or a
/// [`ScreenError`] if the route is not admitted or the backend refuses.
pub async fn delete_equipment<S: CredentialStore>(app: &AppContext<S>, id: i64, confirmed: bool) -> Result<(), ScreenError> {
    enter(app, &Route::AdminEquipment)?;
    confirm(confirmed, "Are you sure you want to delete this equipment?")?;
    app.api()
        .delete_equipment(id)
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to delete equipment"))?;
    tracing::info!(equipment_id = id, "equipment deleted");
    app.notifier().success("Equipment deleted successfully");
    Ok(())
}

// =============================================================================
// USERS
// =============================================================================

/// # Errors
///
/// Returns a [`ScreenError`] if the route is not admitted or the fetch fails.
pub async fn users<S: CredentialStore>(app: &AppContext<S>) -> Result<Vec<User>, ScreenError> {
    enter(app, &Route::AdminUsers)?;
    app.api()
        .users()
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to fetch users"))
}

/// # Errors
///
/// Returns a [`ScreenError`] if the route is not admitted or the fetch fails.
pub async fn user<S: CredentialStore>(app: &AppContext<S>, id: i64) -> Result<User, ScreenError> {
    enter(app, &Route::AdminUsers)?;
    app.api()
        .user(id)
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to fetch user"))
}

/// # Errors
///
/// Returns a [`ScreenError`] if the route is not admitted or the backend refuses.
pub async fn update_user<S: CredentialStore>(app: &AppContext<S>, id: i64, form: &Value) -> Result<User, ScreenError> {
    enter(app, &Route::AdminUsers)?;
    let user = app
        .api()
        .update_user(id, form)
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to update user"))?;
    app.notifier().success("User updated successfully");
    Ok(user)
}

/// # Errors
///
/// Returns [`ScreenError::Unconfirmed`] without `confirmed`, or a
/// [`ScreenError`] if the route is not admitted or the backend refuses.
pub async fn delete_user<S: CredentialStore>(app: &AppContext<S>, id: i64, confirmed: bool) -> Result<(), ScreenError> {
    enter(app, &Route::AdminUsers)?;
    confirm(confirmed, "Are you sure you want to delete this user?")?;
    app.api()
        .delete_user(id)
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to delete user"))?;
    tracing::info!(user_id = id, "user deleted");
    app.notifier().success("User deleted successfully");
    Ok(())
}

// =============================================================================
// RENDER
// =============================================================================

#[must_use]
pub fn render_equipment(items: &[Equipment]) -> String {
    let mut out = String::new();
    for item in items {
        let state = if item.working { "working" } else { "faulty" };
        let _ = writeln!(
            out,
            "#{:<4} {:<24} {:<12} room {:<8} {state}",
            item.id,
            or_dash(item.name.as_deref()),
            or_dash(item.kind.as_deref()),
            or_dash(item.room_number.as_deref()),
        );
    }
    out
}

#[must_use]
pub fn render_users(users: &[User]) -> String {
    let mut out = String::new();
    for user in users {
        let id = user.id.map_or_else(|| "-".to_owned(), |id| id.to_string());
        let _ = writeln!(
            out,
            "#{id:<4} {:<16} {:<9} {:<28} {}",
            user.username,
            user.role.as_str(),
            or_dash(user.email.as_deref()),
            or_dash(user.department.as_deref()),
        );
    }
    out
}
