//! Read-only shortcuts for `list` and `time`.

use axum::extract::State;

use zonealarm_app::dispatcher::Request;
use zonealarm_app::ports::{AlarmSink, ByteStore, ClockSource, TimeSync};

use crate::reply::Reply;
use crate::state::AppState;

/// `GET /api/alarms`: same answer as `{"command":"list"}`.
pub async fn list<B, S, C, T>(State(state): State<AppState<B, S, C, T>>) -> Reply
where
    B: ByteStore + Send + Sync + 'static,
    S: AlarmSink + Send + Sync + 'static,
    C: ClockSource + Send + Sync + 'static,
    T: TimeSync + Send + Sync + 'static,
{
    let mut dispatcher = state.dispatcher.lock().await;
    Reply(dispatcher.dispatch(Request::List).await)
}

/// `GET /api/time`: same answer as `{"command":"time"}`.
pub async fn time<B, S, C, T>(State(state): State<AppState<B, S, C, T>>) -> Reply
where
    B: ByteStore + Send + Sync + 'static,
    S: AlarmSink + Send + Sync + 'static,
    C: ClockSource + Send + Sync + 'static,
    T: TimeSync + Send + Sync + 'static,
{
    let mut dispatcher = state.dispatcher.lock().await;
    Reply(dispatcher.dispatch(Request::Time).await)
}
