//! Shared application state for axum handlers.

use std::sync::Arc;

use tokio::sync::Mutex;

use zonealarm_app::dispatcher::Dispatcher;
use zonealarm_app::firing_bus::InProcessFiringBus;

/// Application state shared across all axum handlers.
///
/// The dispatcher sits behind one async mutex, so requests and ticks run one
/// after the other. `Clone` is implemented manually so the underlying types
/// do not need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<B, S, C, T> {
    /// Protocol dispatcher owning the scheduler.
    pub dispatcher: Arc<Mutex<Dispatcher<B, S, C, T>>>,
    /// Firing bus for the live stream.
    pub firing_bus: Arc<InProcessFiringBus>,
}

impl<B, S, C, T> Clone for AppState<B, S, C, T> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
            firing_bus: Arc::clone(&self.firing_bus),
        }
    }
}

impl<B, S, C, T> AppState<B, S, C, T> {
    /// Create a new application state, taking ownership of the dispatcher.
    pub fn new(dispatcher: Dispatcher<B, S, C, T>, firing_bus: Arc<InProcessFiringBus>) -> Self {
        Self::from_arcs(Arc::new(Mutex::new(dispatcher)), firing_bus)
    }

    /// Create a new application state from a dispatcher that is already
    /// shared with background tasks.
    pub fn from_arcs(
        dispatcher: Arc<Mutex<Dispatcher<B, S, C, T>>>,
        firing_bus: Arc<InProcessFiringBus>,
    ) -> Self {
        Self {
            dispatcher,
            firing_bus,
        }
    }
}
