//! Profile screen and the per-role dashboard greeting.

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use serde_json::Value;

use super::{ScreenError, enter, failed, or_dash};
use crate::app::AppContext;
use crate::net::types::{PasswordChange, User};
use crate::routes::{Route, default_route};
use crate::state::storage::CredentialStore;

/// # Errors
///
/// Returns a [`ScreenError`] if the route is not admitted or the fetch fails.
pub async fn show<S: CredentialStore>(app: &AppContext<S>) -> Result<User, ScreenError> {
    enter(app, &Route::Profile)?;
    app.api()
        .profile()
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to fetch profile"))
}

/// # Errors
///
/// Returns a [`ScreenError`] if the route is not admitted or the backend refuses.
pub async fn update<S: CredentialStore>(app: &AppContext<S>, form: &Value) -> Result<User, ScreenError> {
    enter(app, &Route::Profile)?;
    let user = app
        .api()
        .update_profile(form)
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to update profile"))?;
    app.notifier().success("Profile updated successfully");
    Ok(user)
}

/// # Errors
///
/// Returns a [`ScreenError`] if the route is not admitted or the backend refuses.
pub async fn change_password<S: CredentialStore>(
    app: &AppContext<S>,
    old_password: &str,
    new_password: &str,
) -> Result<(), ScreenError> {
    enter(app, &Route::Profile)?;
    let change = PasswordChange { old_password: old_password.to_owned(), new_password: new_password.to_owned() };
    app.api()
        .change_password(&change)
        .await
        .map_err(|e| failed(app.notifier(), e, "Failed to update password"))?;
    app.notifier().success("Password updated successfully");
    Ok(())
}

/// Greeting for the role's landing route, from the session identity.
///
/// # Errors
///
/// Returns a [`ScreenError`] if there is no session.
pub fn dashboard<S: CredentialStore>(app: &AppContext<S>) -> Result<String, ScreenError> {
    let session = app.session().current();
    let landing = session
        .identity
        .as_ref()
        .map_or(Route::Dashboard, |user| default_route(user.role));
    enter(app, &landing)?;
    let user = session.identity.as_ref().map_or("", |u| u.username.as_str());
    Ok(format!("Welcome back, {user}!\n"))
}

#[must_use]
pub fn render_profile(user: &User) -> String {
    format!(
        "Username:    {}\nFull name:   {}\nEmail:       {}\nDepartment:  {}\nRole:        {}\nPoints:      {}\nStreak:      {}\nBookings:    {}\n",
        user.username,
        or_dash(user.full_name.as_deref()),
        or_dash(user.email.as_deref()),
        or_dash(user.department.as_deref()),
        user.role,
        user.points.unwrap_or(0),
        user.usage_streak.unwrap_or(0),
        user.total_bookings.unwrap_or(0),
    )
}
