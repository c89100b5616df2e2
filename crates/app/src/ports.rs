//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod byte_store;
pub mod clock;
pub mod sink;
pub mod time_sync;

pub use byte_store::ByteStore;
pub use clock::ClockSource;
pub use sink::AlarmSink;
pub use time_sync::TimeSync;
