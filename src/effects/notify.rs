//! User-facing notifications for status changes.

use std::sync::Mutex;

pub const STATUS_UPDATED: &str = "Order status updated";
pub const STATUS_UPDATE_FAILED: &str = "Failed to update order status";

/// Receives non-blocking, dismissible notifications.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// A notification waiting to be shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

/// Emits notifications as log events.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        tracing::info!(notification = message);
    }

    fn error(&self, message: &str) {
        tracing::error!(notification = message);
    }
}

/// Collects notifications until a front end drains them for display.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: Mutex<Vec<Notification>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every queued notification, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, notification: Notification) {
        self.lock().push(notification);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        // A poisoned queue still holds valid notifications.
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Notifier for NotificationQueue {
    fn success(&self, message: &str) {
        self.push(Notification::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(Notification::Error(message.to_string()));
    }
}
