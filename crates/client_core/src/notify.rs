//! Transient, dismissible user notifications.

use std::fmt;

use tokio::sync::broadcast;

const NOTIFICATION_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => f.write_str("info"),
            Self::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

/// Fan-out of notifications to whoever renders them. Sending never fails;
/// with no subscriber the notification is dropped.
#[derive(Debug, Clone)]
pub struct Notifier {
    events: broadcast::Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(NOTIFICATION_BUFFER);
        Self { events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.events.subscribe()
    }

    pub fn info(&self, title: impl Into<String>, description: impl Into<String>) {
        self.emit(NotificationLevel::Info, title.into(), description.into());
    }

    pub fn error(&self, title: impl Into<String>, description: impl Into<String>) {
        self.emit(NotificationLevel::Error, title.into(), description.into());
    }

    fn emit(&self, level: NotificationLevel, title: String, description: String) {
        let _ = self.events.send(Notification {
            level,
            title,
            description,
        });
    }
}
