//! Auth gateway: bootstrap, login, registration and logout.
//!
//! SYSTEM CONTEXT
//! ==============
//! The only writer of the session store and the persisted credential. Talks
//! to the backend through [`AuthBackend`], persists through
//! [`CredentialStore`], reports outcomes on the notification channel and
//! moves the navigator on logout.
//!
//! DESIGN
//! ======
//! Every session-changing operation records the session epoch when it starts
//! and commits through [`AuthGateway::commit`], which applies the result only
//! if the epoch is unchanged. Only user intents advance the epoch: logout
//! (unconditionally) and a login persisting its token. Bootstrap never does,
//! so it can be discarded by a newer login or logout but can never discard
//! one. A slow bootstrap or login re-fetch that resolves after a logout is
//! dropped instead of resurrecting the identity.
//!
//! Login commits twice: once to persist the token (so the re-fetch and any
//! later bootstrap see it) and once to publish the identity. The re-fetch
//! failing degrades the identity to `{username, role}` and is not surfaced.
//! A login superseded by another login is reported as a failure; one
//! superseded by a logout is dropped silently, the logout already spoke.
//!
//! Nothing here retries.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::{Mutex, PoisonError};

use crate::net::api::AuthBackend;
use crate::net::types::{ApiError, LoginRequest, RegisterRequest, User};
use crate::routes::Route;
use crate::routes::navigator::Navigator;
use crate::services::notify::Notifier;
use crate::state::session::{SessionHandle, SessionStore};
use crate::state::storage::{CredentialStore, TOKEN_KEY, USER_KEY};

const LOGIN_OK: &str = "Login successful!";
const LOGIN_FAILED: &str = "Login failed";
const REGISTER_OK: &str = "Registration successful! Please login.";
const REGISTER_FAILED: &str = "Registration failed";
const LOGGED_OUT: &str = "Logged out";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The backend refused the operation or could not be reached.
    #[error("{0}")]
    Rejected(String),
    /// The session changed (logout or another login) while this operation
    /// was in flight; its result was discarded.
    #[error("session changed while the request was in flight")]
    Superseded,
}

/// What moved the epoch past an operation's start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stale {
    ByLogout,
    ByLogin,
}

#[derive(Default)]
struct Epoch {
    value: u64,
    /// `value` right after the most recent logout.
    logout_at: u64,
}

/// Session lifecycle over a backend and a credential store.
pub struct AuthGateway<B, S> {
    backend: B,
    storage: S,
    store: SessionStore,
    navigator: Navigator,
    notifier: Notifier,
    epoch: Mutex<Epoch>,
}

impl<B: AuthBackend, S: CredentialStore> AuthGateway<B, S> {
    /// `navigator` must observe `store` (built from `store.handle()`).
    pub fn new(backend: B, storage: S, store: SessionStore, navigator: Navigator, notifier: Notifier) -> Self {
        Self { backend, storage, store, navigator, notifier, epoch: Mutex::new(Epoch::default()) }
    }

    #[must_use]
    pub fn session(&self) -> SessionHandle {
        self.store.handle()
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The persisted bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    // =========================================================================
    // BOOTSTRAP
    // =========================================================================

    /// Restore the session from a persisted token. Runs once at start-up.
    ///
    /// Never fails: a rejected or unreachable check clears the stored
    /// credential and settles anonymous.
    pub async fn bootstrap(&self) {
        let started = self.current_epoch();

        let Some(token) = self.token() else {
            tracing::debug!("bootstrap: no stored token");
            let _ = self.commit(started, "bootstrap", false, || self.store.settle(None));
            return;
        };

        match self.fetch_identity(&token).await {
            Ok(user) => {
                let username = user.username.clone();
                if self.commit(started, "bootstrap", false, || self.store.settle(Some(user))).is_ok() {
                    tracing::info!(%username, "session restored");
                }
            }
            Err(e) => {
                tracing::warn!(code = e.error_code(), error = %e, "stored token rejected; clearing");
                let _ = self.commit(started, "bootstrap", false, || {
                    self.clear_credentials();
                    self.store.settle(None);
                });
            }
        }
    }

    // =========================================================================
    // LOGIN
    // =========================================================================

    /// Exchange credentials for a token and publish the resulting identity.
    ///
    /// # Errors
    ///
    /// [`AuthError::Rejected`] with the backend message (or "Login failed")
    /// when the login call fails; nothing is persisted in that case.
    /// [`AuthError::Superseded`] when a logout or another login committed
    /// while the call was in flight.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let started = self.current_epoch();
        let request = LoginRequest { username: username.to_owned(), password: password.to_owned() };

        let response = match self.backend.login(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(code = e.error_code(), error = %e, %username, "login request failed");
                return Err(self.reject(rejection_message(&e), LOGIN_FAILED));
            }
        };

        if !response.is_success() {
            let message = response.message().map(ToOwned::to_owned);
            tracing::info!(%username, ?message, "login rejected");
            return Err(self.reject(message, LOGIN_FAILED));
        }

        let outer_token = response.token.clone();
        let data = match response.into_data() {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(code = e.error_code(), error = %e, "login payload unusable");
                return Err(self.reject(None, LOGIN_FAILED));
            }
        };
        let Some(token) = data.token.clone().filter(|t| !t.is_empty()).or(outer_token) else {
            tracing::warn!(%username, "login succeeded without a token");
            return Err(self.reject(None, LOGIN_FAILED));
        };

        self.commit(started, "login", true, || self.persist(TOKEN_KEY, &token))
            .map_err(|stale| self.superseded(stale))?;
        let persisted = started.wrapping_add(1);

        let (identity, cached) = match self.fetch_identity(&token).await {
            Ok(user) => (user, true),
            Err(e) => {
                tracing::debug!(code = e.error_code(), error = %e, "profile re-fetch failed; using login payload");
                (User::minimal(&data.username, data.role), false)
            }
        };

        self.commit(persisted, "login", false, || {
            if cached {
                match serde_json::to_string(&identity) {
                    Ok(json) => self.persist(USER_KEY, &json),
                    Err(e) => tracing::warn!(error = %e, "user cache encode failed"),
                }
            }
            self.store.settle(Some(identity.clone()));
        })
        .map_err(|stale| self.superseded(stale))?;

        tracing::info!(username = %identity.username, role = %identity.role, "logged in");
        self.notifier.success(LOGIN_OK);
        Ok(())
    }

    // =========================================================================
    // REGISTER
    // =========================================================================

    /// Create an account. Never touches the session.
    ///
    /// # Errors
    ///
    /// [`AuthError::Rejected`] with the backend message or "Registration failed".
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), AuthError> {
        let message = match self.backend.register(request).await {
            Ok(response) if response.is_success() => {
                tracing::info!(username = %request.username, role = %request.role, "registered");
                self.notifier.success(REGISTER_OK);
                return Ok(());
            }
            Ok(response) => response.message().map(ToOwned::to_owned),
            Err(e) => {
                tracing::warn!(code = e.error_code(), error = %e, "register request failed");
                rejection_message(&e)
            }
        };
        Err(self.reject(message, REGISTER_FAILED))
    }

    // =========================================================================
    // LOGOUT
    // =========================================================================

    /// Drop the session locally and go to the login screen. Does not call the
    /// backend and cannot fail.
    pub fn logout(&self) {
        {
            let mut epoch = self.epoch.lock().unwrap_or_else(PoisonError::into_inner);
            epoch.value = epoch.value.wrapping_add(1);
            epoch.logout_at = epoch.value;
            self.clear_credentials();
            self.store.settle(None);
        }
        tracing::info!("logged out");
        self.notifier.info(LOGGED_OUT);
        self.navigator.replace(Route::Login);
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn current_epoch(&self) -> u64 {
        self.epoch.lock().unwrap_or_else(PoisonError::into_inner).value
    }

    /// Apply `apply` if the epoch still equals `started`, advancing it when
    /// `advance` is set. Otherwise reports what moved it.
    fn commit(&self, started: u64, op: &'static str, advance: bool, apply: impl FnOnce()) -> Result<(), Stale> {
        let mut epoch = self.epoch.lock().unwrap_or_else(PoisonError::into_inner);
        if epoch.value != started {
            let stale = if epoch.logout_at > started { Stale::ByLogout } else { Stale::ByLogin };
            tracing::info!(op, started, current = epoch.value, ?stale, "discarding stale session result");
            return Err(stale);
        }
        if advance {
            epoch.value = epoch.value.wrapping_add(1);
        }
        apply();
        Ok(())
    }

    fn superseded(&self, stale: Stale) -> AuthError {
        if stale == Stale::ByLogin {
            self.notifier.error(LOGIN_FAILED);
        }
        AuthError::Superseded
    }

    async fn fetch_identity(&self, token: &str) -> Result<User, ApiError> {
        self.backend.current_user(token).await?.into_data()
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            tracing::warn!(key, error = %e, "credential persist failed");
        }
    }

    fn clear_credentials(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %e, "credential removal failed");
            }
        }
    }

    fn reject(&self, message: Option<String>, fallback: &str) -> AuthError {
        let message = message.unwrap_or_else(|| fallback.to_owned());
        self.notifier.error(message.clone());
        AuthError::Rejected(message)
    }
}

/// Backend-provided message carried by an error, if any.
fn rejection_message(error: &ApiError) -> Option<String> {
    match error {
        ApiError::Rejected { message } if !message.trim().is_empty() => Some(message.clone()),
        _ => None,
    }
}
