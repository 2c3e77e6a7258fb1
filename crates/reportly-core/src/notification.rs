// ── Notification sink ──
//
// Transient success/error messages for toast-style feedback. One sink is
// shared by every data-access service of a session. Messages are not
// persisted or replayed: a subscriber only sees what is sent after it
// subscribed, and a lagging subscriber skips the oldest messages.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;
use tokio::sync::broadcast;

/// Success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// The data-access operation a notification reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    Create,
    FetchOne,
    FetchAll,
    Update,
    Delete,
}

/// A single transient message.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub operation: Operation,
    /// Plural resource label, e.g. `"Unit categories"`.
    pub resource: &'static str,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

/// Cloneable handle to the shared notification channel.
#[derive(Debug, Clone)]
pub struct NotificationSink {
    tx: broadcast::Sender<Notification>,
}

impl NotificationSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to notifications sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub(crate) fn success(&self, operation: Operation, resource: &'static str, text: String) {
        self.send(NotificationKind::Success, operation, resource, text);
    }

    pub(crate) fn error(&self, operation: Operation, resource: &'static str, text: String) {
        self.send(NotificationKind::Error, operation, resource, text);
    }

    fn send(
        &self,
        kind: NotificationKind,
        operation: Operation,
        resource: &'static str,
        text: String,
    ) {
        // No subscribers is fine: nobody is showing toasts right now.
        let _ = self.tx.send(Notification {
            kind,
            operation,
            resource,
            text,
            at: Utc::now(),
        });
    }
}

impl Default for NotificationSink {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    use super::*;

    #[test]
    fn send_without_subscribers_is_silent() {
        let sink = NotificationSink::default();
        sink.success(Operation::Create, "Units", "created".into());
        assert_eq!(sink.receiver_count(), 0);
    }

    #[test]
    fn subscribers_only_see_later_messages() {
        let sink = NotificationSink::default();
        sink.error(Operation::Delete, "Units", "before".into());

        let mut rx = sink.subscribe();
        sink.success(Operation::Delete, "Units", "after".into());

        let n = rx.try_recv().unwrap();
        assert_eq!(n.text, "after");
        assert_eq!(n.kind, NotificationKind::Success);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_oldest() {
        let sink = NotificationSink::new(2);
        let mut rx = sink.subscribe();
        for i in 0..4 {
            sink.error(Operation::FetchAll, "Units", format!("n{i}"));
        }

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(2))));
        assert_eq!(rx.recv().await.unwrap().text, "n2");
        assert_eq!(rx.recv().await.unwrap().text, "n3");
    }

    #[test]
    fn kinds_render_lowercase() {
        assert_eq!(NotificationKind::Error.to_string(), "error");
        assert_eq!(Operation::FetchAll.to_string(), "fetch_all");
    }
}
