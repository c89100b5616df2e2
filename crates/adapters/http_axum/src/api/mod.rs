//! JSON API handler modules.

pub mod alarms;
pub mod command;
pub mod sse;

use axum::Router;
use axum::routing::{get, post};

use zonealarm_app::ports::{AlarmSink, ByteStore, ClockSource, TimeSync};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<B, S, C, T>() -> Router<AppState<B, S, C, T>>
where
    B: ByteStore + Send + Sync + 'static,
    S: AlarmSink + Send + Sync + 'static,
    C: ClockSource + Send + Sync + 'static,
    T: TimeSync + Send + Sync + 'static,
{
    Router::new()
        .route("/command", post(command::handle::<B, S, C, T>))
        .route("/alarms", get(alarms::list::<B, S, C, T>))
        .route("/time", get(alarms::time::<B, S, C, T>))
        .route("/firings/stream", get(sse::stream::<B, S, C, T>))
}
