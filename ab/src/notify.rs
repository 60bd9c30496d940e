//! Notification sink for acknowledgment events
//!
//! The dispatcher emits one notification string per recognized acknowledgment.
//! [`NotificationBus`] fans them out over a tokio broadcast channel so any number
//! of consumers (the CLI, a logger, an upstream reporter) can subscribe.

use tokio::sync::broadcast;
use tracing::debug;

/// Default channel capacity (notifications)
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Fire-and-forget receiver of notification events
pub trait NotificationSink: Send + Sync {
    fn emit(&self, event: &str);
}

/// Broadcast-backed notification sink
pub struct NotificationBus {
    tx: broadcast::Sender<String>,
}

impl NotificationBus {
    /// Create a new bus with the given capacity
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "NotificationBus::new: creating notification bus");
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Create a new bus with default capacity
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Subscribe to receive notifications
    ///
    /// Notifications emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        debug!("NotificationBus::subscribe: new subscriber");
        self.tx.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl NotificationSink for NotificationBus {
    /// If there are no subscribers, the notification is dropped.
    fn emit(&self, event: &str) {
        debug!(%event, "NotificationBus::emit");
        let _ = self.tx.send(event.to_string());
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Sink that records every emitted notification
    #[derive(Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        pub fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl NotificationSink for RecordingSink {
        fn emit(&self, event: &str) {
            self.events.lock().unwrap().push(event.to_string());
        }
    }
}
