//! Application context shared by every screen.
//!
//! SYSTEM CONTEXT
//! ==============
//! Built once at start-up from the [`ClientConfig`]. Screens receive a
//! reference to it and reach the session, navigator, notifier and resource
//! endpoints only through it; nothing in the crate is a global.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use crate::config::ClientConfig;
use crate::net::http::HttpBackend;
use crate::net::resources::ResourceApi;
use crate::net::types::ApiError;
use crate::routes::Route;
use crate::routes::guard::Admission;
use crate::routes::navigator::{Location, Navigator};
use crate::services::auth::AuthGateway;
use crate::services::notify::Notifier;
use crate::state::session::{SessionHandle, SessionStore};
use crate::state::storage::CredentialStore;

/// Why a route could not be entered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OpenError {
    #[error("session is still loading")]
    Pending,
    #[error("login required for {requested}")]
    LoginRequired { requested: Route },
    #[error("{requested} is not available; redirected to {landed}")]
    Redirected { requested: Route, landed: Route },
}

pub struct AppContext<S> {
    gateway: AuthGateway<HttpBackend, S>,
    notifier: Notifier,
}

impl<S: CredentialStore> AppContext<S> {
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, storage: S, notifier: Notifier) -> Result<Self, ApiError> {
        Ok(Self::with_backend(HttpBackend::from_config(config)?, storage, notifier))
    }

    #[must_use]
    pub fn with_backend(backend: HttpBackend, storage: S, notifier: Notifier) -> Self {
        let store = SessionStore::new();
        let navigator = Navigator::new(store.handle());
        let gateway = AuthGateway::new(backend, storage, store, navigator, notifier.clone());
        Self { gateway, notifier }
    }

    #[must_use]
    pub fn auth(&self) -> &AuthGateway<HttpBackend, S> {
        &self.gateway
    }

    #[must_use]
    pub fn session(&self) -> SessionHandle {
        self.gateway.session()
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        self.gateway.navigator()
    }

    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Resource endpoints authenticated with the current token.
    #[must_use]
    pub fn api(&self) -> ResourceApi<'_> {
        ResourceApi::new(self.gateway.backend(), self.gateway.token())
    }

    /// Run bootstrap, then re-check the current location against the settled session.
    pub async fn start(&self) -> Admission {
        self.gateway.bootstrap().await;
        self.navigator().revalidate()
    }

    /// Navigate to `path` and succeed only if the guard admits it.
    ///
    /// # Errors
    ///
    /// Returns an [`OpenError`] describing where the navigator landed instead.
    pub fn open(&self, path: &str) -> Result<Route, OpenError> {
        let requested = Route::parse(path);
        let decision = self.navigator().go(requested.clone());
        let Location { route: landed, .. } = self.navigator().current();
        match decision {
            Admission::Allow => Ok(landed),
            Admission::Pending => Err(OpenError::Pending),
            Admission::RedirectToLogin { .. } => Err(OpenError::LoginRequired { requested }),
            Admission::RedirectToDefault(_) => Err(OpenError::Redirected { requested, landed }),
        }
    }
}
