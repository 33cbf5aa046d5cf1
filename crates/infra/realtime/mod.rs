use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::repositories::realtime::RealtimeNotifier;

const ADMIN_CHANNEL_CAPACITY: usize = 64;

/// One event on the admin channel, ready for the wire.
#[derive(Debug, Clone, Serialize)]
pub struct AdminEvent {
    pub event: String,
    pub payload: Value,
}

/// In-process fan-out backing the admin event stream. Slow subscribers that
/// fall behind the channel capacity lose the oldest events rather than
/// stalling the publisher.
pub struct BroadcastNotifier {
    sender: broadcast::Sender<AdminEvent>,
}

impl BroadcastNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(ADMIN_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AdminEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeNotifier for BroadcastNotifier {
    fn emit_to_admins(&self, event: &str, payload: Value) {
        let receivers = self
            .sender
            .send(AdminEvent {
                event: event.to_string(),
                payload,
            })
            .unwrap_or(0);

        debug!(%event, receivers, "admin event emitted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn subscriber_receives_emitted_event() {
        let notifier = BroadcastNotifier::new();
        let mut rx = notifier.subscribe();

        notifier.emit_to_admins("payments:new", json!({"payment_id": 7}));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event, "payments:new");
        assert_eq!(event.payload["payment_id"], 7);
    }

    #[tokio::test]
    async fn emitting_without_subscribers_is_a_no_op() {
        let notifier = BroadcastNotifier::new();
        notifier.emit_to_admins("servers:expired", json!({"server_ids": [1, 2]}));
    }
}
