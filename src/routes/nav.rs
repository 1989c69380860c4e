//! Navigation shell: the links shown for the current session.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use super::Route;
use super::guard::{Admission, admit};
use crate::state::session::SessionSnapshot;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub route: Route,
    pub active: bool,
}

const AUTHENTICATED: &[(&str, Route)] = &[
    ("Dashboard", Route::Dashboard),
    ("Book Room", Route::BookRoom),
    ("My Bookings", Route::MyBookings),
    ("Dashboard", Route::AdminDashboard),
    ("Rooms", Route::AdminRooms),
    ("Users", Route::AdminUsers),
    ("Equipment", Route::AdminEquipment),
    ("Profile", Route::Profile),
];

const ANONYMOUS: &[(&str, Route)] = &[("Login", Route::Login), ("Register", Route::Register)];

/// Links for `session`, with the one matching `current` marked active.
///
/// Authenticated links are filtered through the guard, so a link is shown
/// exactly when following it would be admitted.
#[must_use]
pub fn links(session: &SessionSnapshot, current: &Route) -> Vec<NavLink> {
    if session.is_loading {
        return Vec::new();
    }

    let candidates = if session.is_authenticated() { AUTHENTICATED } else { ANONYMOUS };
    candidates
        .iter()
        .filter(|(_, route)| admit(session, route) == Admission::Allow)
        .map(|(label, route)| NavLink { label: *label, route: route.clone(), active: route == current })
        .collect()
}
