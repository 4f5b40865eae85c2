//! Notification dispatch
//!
//! Transactional emails (order confirmation, verification results) are
//! observability, not consistency: a state transition never waits on, or is
//! rolled back by, a notification. Events go onto an unbounded channel and a
//! background worker hands them to a [`NotificationSink`]. Delivery failures
//! are logged and dropped.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;

/// Lifecycle events worth telling someone about
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationEvent {
    OrderCreated {
        order_id: String,
        user_id: String,
        total: String,
    },
    PaymentSubmitted {
        order_id: String,
        payment_id: String,
        user_id: String,
    },
    PaymentVerified {
        order_id: String,
        payment_id: String,
        user_id: String,
    },
    PaymentRejected {
        order_id: String,
        payment_id: String,
        user_id: String,
        notes: String,
    },
    FulfillmentAdvanced {
        order_id: String,
        user_id: String,
        status: String,
    },
}

/// Delivery backend. The default [`LogSink`] just logs; a mail provider
/// integration implements this trait without touching the core.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, event: &NotificationEvent) -> Result<(), String>;
}

/// Sink that writes events to the log
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, event: &NotificationEvent) -> Result<(), String> {
        let payload = serde_json::to_string(event).unwrap_or_else(|_| format!("{event:?}"));
        tracing::info!(target: "notify", %payload, "Notification dispatched");
        Ok(())
    }
}

/// Fire-and-forget notification service
///
/// Cheap to clone; all clones feed the same worker.
#[derive(Clone)]
pub struct NotificationService {
    tx: mpsc::UnboundedSender<NotificationEvent>,
}

impl NotificationService {
    /// Spawn the delivery worker and return the service handle
    pub fn start(sink: Arc<dyn NotificationSink>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<NotificationEvent>();

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(e) = sink.deliver(&event).await {
                    tracing::warn!(target: "notify", error = %e, ?event, "Notification delivery failed");
                }
            }
        });

        Self { tx }
    }

    /// Queue an event. Never blocks, never fails the caller; if the worker
    /// is gone the event is logged and dropped.
    pub fn dispatch(&self, event: NotificationEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::warn!(target: "notify", event = ?e.0, "Notification worker unavailable, event dropped");
        }
    }
}
