//! Route admission.
//!
//! [`admit`] is a pure function of the session snapshot and the requested
//! route; callers re-run it on every navigation and every session change.
//! Rules, first match wins:
//!
//! 1. bootstrap still pending → [`Admission::Pending`]
//! 2. public route → allow
//! 3. index or unknown path → the role's landing route, or login
//! 4. no identity → login, remembering the requested route
//! 5. role not in the allowed set → the role's landing route
//! 6. allow

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use super::{Access, Route, default_route};
use crate::state::session::SessionSnapshot;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Admission {
    /// Render a loading indicator; decide again once the session settles.
    Pending,
    Allow,
    RedirectToLogin { from: Option<Route> },
    RedirectToDefault(Route),
}

impl Admission {
    /// Where the caller should end up, if anywhere other than the request.
    #[must_use]
    pub fn redirect_target(&self) -> Option<Route> {
        match self {
            Self::RedirectToLogin { .. } => Some(Route::Login),
            Self::RedirectToDefault(route) => Some(route.clone()),
            Self::Pending | Self::Allow => None,
        }
    }
}

#[must_use]
pub fn admit(session: &SessionSnapshot, route: &Route) -> Admission {
    if session.is_loading {
        return Admission::Pending;
    }

    let roles = match route.access() {
        Access::Public => return Admission::Allow,
        Access::Index => {
            return match &session.identity {
                Some(user) => Admission::RedirectToDefault(default_route(user.role)),
                None => Admission::RedirectToLogin { from: None },
            };
        }
        Access::Protected(roles) => roles,
    };

    let Some(user) = &session.identity else {
        return Admission::RedirectToLogin { from: Some(route.clone()) };
    };

    if roles.contains(&user.role) {
        Admission::Allow
    } else {
        Admission::RedirectToDefault(default_route(user.role))
    }
}
