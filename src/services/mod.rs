//! Session services: the auth gateway and the notification channel it reports on.

pub mod auth;
pub mod notify;
