//! Transient user-facing notifications.
//!
//! DESIGN
//! ======
//! The gateway and screens push [`Notification`]s into an unbounded mpsc
//! channel; the presentation layer drains and prints them. Sending never
//! fails from the caller's point of view: a dropped receiver just means
//! nobody is listening.

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use tokio::sync::mpsc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

impl NotificationLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Create a connected notifier and receiver.
#[must_use]
pub fn channel() -> (Notifier, mpsc::UnboundedReceiver<Notification>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Notifier { tx: Some(tx) }, rx)
}

/// Sending half of the notification channel. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Notifier {
    tx: Option<mpsc::UnboundedSender<Notification>>,
}

impl Notifier {
    /// A notifier that discards everything.
    #[must_use]
    pub fn silent() -> Self {
        Self { tx: None }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(NotificationLevel::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(NotificationLevel::Error, message.into());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(NotificationLevel::Info, message.into());
    }

    fn emit(&self, level: NotificationLevel, message: String) {
        tracing::debug!(level = level.as_str(), %message, "notification");
        let Some(tx) = &self.tx else { return };
        if tx.send(Notification { level, message }).is_err() {
            tracing::trace!("notification receiver closed");
        }
    }
}
