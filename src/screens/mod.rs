//! Feature screens.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each screen operation opens its route through the [`AppContext`] first and
//! only calls the backend when the guard admits it. Outcomes are reported on
//! the notification channel with the same wording the web client used; the
//! returned value is what the caller renders.
//!
//! DESIGN
//! ======
//! A backend rejection surfaces the backend's own message. Anything else
//! (transport, undecodable body) surfaces a fixed per-operation fallback and
//! is logged with its error code.

pub mod admin;
pub mod bookings;
pub mod profile;

use crate::app::{AppContext, OpenError};
use crate::net::types::ApiError;
use crate::routes::Route;
use crate::services::notify::Notifier;
use crate::state::storage::CredentialStore;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScreenError {
    #[error(transparent)]
    Open(#[from] OpenError),
    /// Input rejected before any request was made.
    #[error("{0}")]
    Invalid(String),
    /// The backend call failed; the message has already been notified.
    #[error("{0}")]
    Failed(String),
    /// A destructive action was requested without confirmation.
    #[error("{0} Re-run with --yes to confirm.")]
    Unconfirmed(&'static str),
}

/// Open `route` or fail with where the navigator landed instead.
fn enter<S: CredentialStore>(app: &AppContext<S>, route: &Route) -> Result<(), ScreenError> {
    app.open(&route.path())?;
    Ok(())
}

/// Notify and convert a failed backend call.
fn failed(notifier: &Notifier, error: ApiError, fallback: &str) -> ScreenError {
    let message = match error {
        ApiError::Rejected { message } => message,
        other => {
            tracing::warn!(code = other.error_code(), error = %other, "{fallback}");
            fallback.to_owned()
        }
    };
    notifier.error(message.clone());
    ScreenError::Failed(message)
}

/// Notify and convert invalid input.
fn invalid(notifier: &Notifier, message: &str) -> ScreenError {
    notifier.error(message);
    ScreenError::Invalid(message.to_owned())
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}
