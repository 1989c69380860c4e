//! Route table and the role-based admission layer built on it.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every screen is reached through a [`Route`]. The [`guard`] decides whether
//! a route may be entered for a session snapshot, the [`navigator`] applies
//! that decision to the current location, and [`nav`] derives the link set
//! shown to the user.
//!
//! DESIGN
//! ======
//! The table is static: each route maps to one [`Access`] rule through a
//! total match, and so does each role to its landing route. Adding a route or
//! a role is a compile error until both tables cover it.

pub mod guard;
pub mod nav;
pub mod navigator;


use std::fmt;

use crate::net::types::Role;

const STAFF: &[Role] = &[Role::Student, Role::Lecturer];
const EVERYONE: &[Role] = &[Role::Student, Role::Lecturer, Role::Admin];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// A client-side location.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Index,
    Login,
    Register,
    Dashboard,
    BookRoom,
    MyBookings,
    Profile,
    AdminDashboard,
    AdminRooms,
    AdminRoomNew,
    AdminRoomEdit(i64),
    AdminEquipment,
    AdminUsers,
    /// Any path outside the table, kept verbatim for logging.
    NotFound(String),
}

/// Who may enter a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Reachable without a session.
    Public,
    /// Resolves to a landing route instead of rendering anything itself.
    Index,
    /// Requires a session whose role is in the set.
    Protected(&'static [Role]),
}

impl Route {
    /// Parse a path. Query strings, fragments and a trailing slash are ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let path = raw.split(['?', '#']).next().unwrap_or_default().trim();
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Index,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["dashboard"] => Self::Dashboard,
            ["book-room"] => Self::BookRoom,
            ["my-bookings"] => Self::MyBookings,
            ["profile"] => Self::Profile,
            ["admin", "dashboard"] => Self::AdminDashboard,
            ["admin", "rooms"] => Self::AdminRooms,
            ["admin", "rooms", "new"] => Self::AdminRoomNew,
            ["admin", "rooms", "edit", id] => id
                .parse()
                .map_or_else(|_| Self::NotFound(path.to_owned()), Self::AdminRoomEdit),
            ["admin", "equipment"] => Self::AdminEquipment,
            ["admin", "users"] => Self::AdminUsers,
            _ => Self::NotFound(path.to_owned()),
        }
    }

    /// Canonical path for this route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Index => "/".to_owned(),
            Self::Login => "/login".to_owned(),
            Self::Register => "/register".to_owned(),
            Self::Dashboard => "/dashboard".to_owned(),
            Self::BookRoom => "/book-room".to_owned(),
            Self::MyBookings => "/my-bookings".to_owned(),
            Self::Profile => "/profile".to_owned(),
            Self::AdminDashboard => "/admin/dashboard".to_owned(),
            Self::AdminRooms => "/admin/rooms".to_owned(),
            Self::AdminRoomNew => "/admin/rooms/new".to_owned(),
            Self::AdminRoomEdit(id) => format!("/admin/rooms/edit/{id}"),
            Self::AdminEquipment => "/admin/equipment".to_owned(),
            Self::AdminUsers => "/admin/users".to_owned(),
            Self::NotFound(path) => path.clone(),
        }
    }

    #[must_use]
    pub fn access(&self) -> Access {
        match self {
            Self::Login | Self::Register => Access::Public,
            Self::Index | Self::NotFound(_) => Access::Index,
            Self::Dashboard | Self::BookRoom | Self::MyBookings => Access::Protected(STAFF),
            Self::Profile => Access::Protected(EVERYONE),
            Self::AdminDashboard
            | Self::AdminRooms
            | Self::AdminRoomNew
            | Self::AdminRoomEdit(_)
            | Self::AdminEquipment
            | Self::AdminUsers => Access::Protected(ADMIN_ONLY),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Landing route for a role.
#[must_use]
pub fn default_route(role: Role) -> Route {
    match role {
        Role::Admin => Route::AdminDashboard,
        Role::Student | Role::Lecturer => Route::Dashboard,
    }
}
