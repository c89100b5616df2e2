//! # zonealarm-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ByteStore`: durable key to bytes mapping for snapshots
//!   - `AlarmSink`: receives firings for a zone
//!   - `ClockSource`: settable wall clock that can report "unset"
//!   - `TimeSync`: external time acquisition
//! - Define **driving/inbound** use-cases:
//!   - `Scheduler`: add, delete, list, tick, snapshot save/load
//!   - `Dispatcher`: maps structured protocol requests onto the scheduler
//! - Provide **in-process infrastructure** that doesn't need IO
//!   (firing bus, in-memory byte store)
//!
//! ## Dependency rule
//! Depends on `zonealarm-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod dispatcher;
pub mod firing_bus;
pub mod memory_store;
pub mod persistence;
pub mod ports;
pub mod scheduler;
pub mod trigger_engine;
