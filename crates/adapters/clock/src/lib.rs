//! # zonealarm-adapter-clock
//!
//! Clock adapters built on the host clock.
//!
//! - [`SystemClock`] implements `ClockSource`: host time shifted to a fixed
//!   UTC offset, plus a correction applied by `set`. It reports "unset" until
//!   a time is established, unless the host time is trusted from the start.
//! - [`HostTimeSync`] implements `TimeSync`: reads the host epoch, checks
//!   that it is plausible and converts it to local wall-clock time.
//!
//! ## Dependency rule
//!
//! Depends on `zonealarm-app` (port traits) and `zonealarm-domain` only.

mod host_sync;
mod system_clock;

pub use host_sync::{HostTimeSync, PLAUSIBLE_EPOCHS};
pub use system_clock::SystemClock;
