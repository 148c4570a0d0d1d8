//! Notification sinks for hosts without a UI toast.

use proximity_core::ports::{Notification, NotificationSink, Severity};
use std::sync::Mutex;

/// Emits notifications as structured log events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        let Notification { title, message, severity } = notification;
        match severity {
            Severity::Error => tracing::error!(%title, %message, "Notification"),
            Severity::Warning => tracing::warn!(%title, %message, "Notification"),
            Severity::Info | Severity::Success => tracing::info!(%title, %message, "Notification"),
        }
    }
}

/// Keeps every notification in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    received: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<Notification> {
        self.received.lock().ok().and_then(|n| n.last().cloned())
    }

    /// Remove and return everything received so far
    pub fn take(&self) -> Vec<Notification> {
        self.received.lock().map(|mut n| std::mem::take(&mut *n)).unwrap_or_default()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: Notification) {
        if let Ok(mut received) = self.received.lock() {
            received.push(notification);
        }
    }
}
