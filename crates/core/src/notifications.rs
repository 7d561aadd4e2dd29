//! User-facing confirmation notifications ("toasts").
//!
//! Editors accept an `Arc<dyn Notifier>` and fire a notification after each
//! change that actually alters a sequence. Delivery is fire-and-forget: no
//! acknowledgement is expected and a notifier must never fail the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

/// A human-readable confirmation emitted on a side channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Trait for delivering notifications. Implementations route them to a
/// toast layer, a log, or a test buffer.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// No-op notifier for callers that don't surface confirmations.
pub struct NoOpNotifier;

impl Notifier for NoOpNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Writes every notification to the tracing pipeline.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        info!(
            title = %notification.title,
            message = %notification.message,
            "Notification"
        );
    }
}

/// In-memory notifier that captures notifications for testing.
#[derive(Default)]
pub struct CaptureNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl CaptureNotifier {
    pub fn new() -> Self {
        Self {
            notifications: Mutex::new(Vec::new()),
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .expect("notifier mutex poisoned")
            .clone()
    }

    pub fn count(&self) -> usize {
        self.notifications
            .lock()
            .expect("notifier mutex poisoned")
            .len()
    }

    pub fn titles(&self) -> Vec<String> {
        self.notifications
            .lock()
            .expect("notifier mutex poisoned")
            .iter()
            .map(|n| n.title.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.notifications
            .lock()
            .expect("notifier mutex poisoned")
            .clear();
    }
}

impl Notifier for CaptureNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
    }
}

/// Convenience builder for a confirmation notification.
pub fn make_notification(title: impl Into<String>, message: impl Into<String>) -> Notification {
    Notification {
        id: Uuid::new_v4(),
        title: title.into(),
        message: message.into(),
        timestamp: Utc::now(),
    }
}

pub fn noop_notifier() -> Arc<dyn Notifier> {
    Arc::new(NoOpNotifier)
}

pub fn capture_notifier() -> Arc<CaptureNotifier> {
    Arc::new(CaptureNotifier::new())
}
