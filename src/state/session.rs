//! Auth-session state for the current client.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by the route guard, the navigation shell and identity-aware screens.
//! Readers hold a [`SessionHandle`]; only the auth gateway owns the
//! [`SessionStore`] and its crate-private mutators.
//!
//! DESIGN
//! ======
//! Identity and the loading flag live in one snapshot published through a
//! `tokio::sync::watch` channel, so a reader never observes one field of a
//! transition without the other.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use tokio::sync::watch;

use crate::net::types::User;

/// Authentication state: the current user and whether bootstrap is pending.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub identity: Option<User>,
    pub is_loading: bool,
}

impl SessionSnapshot {
    /// State at process start, before bootstrap has run.
    #[must_use]
    pub fn loading() -> Self {
        Self { identity: None, is_loading: true }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::loading()
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Owner of the session snapshot. Mutation is crate-private.
pub struct SessionStore {
    tx: watch::Sender<SessionSnapshot>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot::loading());
        Self { tx }
    }

    /// A read-only handle onto this store.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle { rx: self.tx.subscribe() }
    }

    #[must_use]
    pub fn current(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    /// Publish a settled session: `identity` set or cleared, loading done.
    pub(crate) fn settle(&self, identity: Option<User>) {
        self.tx.send_replace(SessionSnapshot { identity, is_loading: false });
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// HANDLE
// =============================================================================

/// Cloneable read-only view of the session.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    rx: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    #[must_use]
    pub fn current(&self) -> SessionSnapshot {
        self.rx.borrow().clone()
    }

    /// Wait for the next published snapshot. Returns `false` once the store
    /// has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Wait until bootstrap has finished and return the settled snapshot.
    pub async fn wait_until_ready(&mut self) -> SessionSnapshot {
        let ready = self
            .rx
            .wait_for(|s| !s.is_loading)
            .await
            .map(|s| s.clone());
        ready.unwrap_or_else(|_| self.current())
    }
}
