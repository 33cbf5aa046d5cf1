use mockall::automock;
use serde_json::Value;

/// Fire-and-forget broadcast to subscribed admin sessions. No delivery
/// guarantee and no backpressure; emitting with nobody listening is normal.
#[automock]
pub trait RealtimeNotifier {
    fn emit_to_admins(&self, event: &str, payload: Value);
}
