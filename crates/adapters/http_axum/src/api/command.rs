//! `POST /api/command`: the device protocol over HTTP.

use axum::extract::State;

use zonealarm_app::ports::{AlarmSink, ByteStore, ClockSource, TimeSync};

use crate::reply::Reply;
use crate::state::AppState;

/// Hand the raw request body to the dispatcher.
///
/// The body is parsed by the dispatcher itself so malformed JSON gets the
/// protocol's "Invalid JSON" answer rather than an extractor rejection.
pub async fn handle<B, S, C, T>(State(state): State<AppState<B, S, C, T>>, body: String) -> Reply
where
    B: ByteStore + Send + Sync + 'static,
    S: AlarmSink + Send + Sync + 'static,
    C: ClockSource + Send + Sync + 'static,
    T: TimeSync + Send + Sync + 'static,
{
    let mut dispatcher = state.dispatcher.lock().await;
    Reply(dispatcher.dispatch_json(&body).await)
}
