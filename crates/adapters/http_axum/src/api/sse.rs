//! Server-Sent Events (SSE) stream of firings.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use zonealarm_app::ports::{AlarmSink, ByteStore, ClockSource, TimeSync};

use crate::state::AppState;

/// `GET /api/firings/stream`: every firing as a JSON `data:` frame.
///
/// The stream continues until the client disconnects or the bus is closed.
pub async fn stream<B, S, C, T>(
    State(state): State<AppState<B, S, C, T>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    B: ByteStore + Send + Sync + 'static,
    S: AlarmSink + Send + Sync + 'static,
    C: ClockSource + Send + Sync + 'static,
    T: TimeSync + Send + Sync + 'static,
{
    let firing_rx = state.firing_bus.subscribe();
    let firing_stream = BroadcastStream::new(firing_rx).filter_map(|result| match result {
        Ok(firing) => match serde_json::to_string(&firing) {
            Ok(json) => Some(Ok(Event::default().event("firing").data(json))),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize firing for SSE stream");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(n)) => {
            tracing::warn!(skipped = n, "SSE subscriber lagged, some firings were dropped");
            None
        }
    });

    Sse::new(firing_stream).keep_alive(KeepAlive::default())
}
