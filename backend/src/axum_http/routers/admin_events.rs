use std::{convert::Infallible, sync::Arc};

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use crates::infra::realtime::BroadcastNotifier;
use tokio_stream::{
    Stream, StreamExt,
    wrappers::{BroadcastStream, errors::BroadcastStreamRecvError},
};
use tracing::warn;

use crate::auth::AuthAdmin;

pub fn routes(notifier: Arc<BroadcastNotifier>) -> Router {
    Router::new().route("/", get(stream)).with_state(notifier)
}

/// Server-sent event stream of workflow events for admin dashboards. A
/// lagged subscriber drops the missed events and keeps going.
pub async fn stream(
    State(notifier): State<Arc<BroadcastNotifier>>,
    AuthAdmin { admin_id }: AuthAdmin,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = notifier.subscribe();

    let stream = BroadcastStream::new(receiver).filter_map(move |event| match event {
        Ok(event) => match serde_json::to_string(&event.payload) {
            Ok(data) => Some(Ok(Event::default().event(event.event).data(data))),
            Err(err) => {
                warn!(%admin_id, serialize_error = ?err, "admin_events: dropping unserializable event");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            warn!(%admin_id, skipped, "admin_events: subscriber lagged");
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
