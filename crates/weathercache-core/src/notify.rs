//! Notification sink for operational warnings.
//!
//! The station reports failures it cannot propagate (a failed scheduled fetch,
//! an unreadable persisted file) through a `Notifier`. The default sink turns
//! them into `tracing` warnings.

use std::sync::Mutex;

use tracing::warn;

pub trait Notifier: Send + Sync {
    /// Publish a warning from a named source.
    fn publish_warning(&self, source: &str, message: &str);
}

/// Logs warnings through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn publish_warning(&self, source: &str, message: &str) {
        warn!(source, "{}", message);
    }
}

/// A published warning, as captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub source: String,
    pub message: String,
}

/// Keeps every warning in memory. Useful for tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn publish_warning(&self, source: &str, message: &str) {
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push(Notification {
                source: source.to_string(),
                message: message.to_string(),
            });
        }
        warn!(source, "{}", message);
    }
}
