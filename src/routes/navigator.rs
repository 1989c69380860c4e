//! Current client location and guarded navigation.
//!
//! DESIGN
//! ======
//! The location lives in a `watch` channel next to the session snapshot.
//! [`Navigator::navigate`] asks the guard and applies its decision in one
//! step, so the published location is always one the guard has admitted
//! (or a pending request waiting for bootstrap). A login redirect records the
//! requested route in [`Location::from`] for [`Navigator::return_after_login`].

#[cfg(test)]
#[path = "navigator_test.rs"]
mod navigator_test;

use std::sync::Arc;

use tokio::sync::watch;

use super::Route;
use super::guard::{Admission, admit};
use crate::state::session::SessionHandle;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub route: Route,
    /// Route to resume after login, set by a login redirect.
    pub from: Option<Route>,
}

impl Location {
    #[must_use]
    pub fn at(route: Route) -> Self {
        Self { route, from: None }
    }
}

/// Shared navigation state. Clones observe and move the same location.
#[derive(Clone, Debug)]
pub struct Navigator {
    tx: Arc<watch::Sender<Location>>,
    session: SessionHandle,
}

impl Navigator {
    #[must_use]
    pub fn new(session: SessionHandle) -> Self {
        let (tx, _rx) = watch::channel(Location::at(Route::Index));
        Self { tx: Arc::new(tx), session }
    }

    #[must_use]
    pub fn current(&self) -> Location {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Location> {
        self.tx.subscribe()
    }

    /// Parse `path` and navigate to it.
    pub fn navigate(&self, path: &str) -> Admission {
        self.go(Route::parse(path))
    }

    /// Navigate to `route` through the guard and publish the outcome.
    pub fn go(&self, route: Route) -> Admission {
        let decision = admit(&self.session.current(), &route);
        let location = match &decision {
            Admission::Allow | Admission::Pending => Location::at(route.clone()),
            Admission::RedirectToLogin { from } => Location { route: Route::Login, from: from.clone() },
            Admission::RedirectToDefault(target) => Location::at(target.clone()),
        };
        tracing::debug!(requested = %route, landed = %location.route, ?decision, "navigate");
        self.tx.send_replace(location);
        decision
    }

    /// Move to `route` without consulting the guard.
    pub fn replace(&self, route: Route) {
        tracing::debug!(%route, "navigate replace");
        self.tx.send_replace(Location::at(route));
    }

    /// Re-run the guard for the current location, e.g. after the session
    /// changed. An admitted or pending location is left as is, `from` included.
    pub fn revalidate(&self) -> Admission {
        let current = self.current();
        let decision = admit(&self.session.current(), &current.route);
        match decision {
            Admission::Allow | Admission::Pending => decision,
            _ => self.go(current.route),
        }
    }

    /// After a successful login, resume the remembered route, else the index.
    pub fn return_after_login(&self) -> Admission {
        let target = self.current().from.unwrap_or(Route::Index);
        self.go(target)
    }
}
