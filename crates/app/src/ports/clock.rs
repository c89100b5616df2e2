//! Clock port: the wall-clock source the trigger engine reads.

use zonealarm_domain::error::ClockError;
use zonealarm_domain::time::WallClock;

/// A settable local wall clock.
///
/// Reads are synchronous: a clock is a register, not IO.
pub trait ClockSource {
    /// Current reading.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Unset`] when no valid time was ever established
    /// and [`ClockError::ImplausibleYear`] when the reading is outside the
    /// supported years.
    fn now(&self) -> Result<WallClock, ClockError>;

    /// Set the clock to `at`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::ImplausibleYear`] when `at` is outside the
    /// supported years.
    fn set(&self, at: WallClock) -> Result<(), ClockError>;
}

impl<T: ClockSource> ClockSource for std::sync::Arc<T> {
    fn now(&self) -> Result<WallClock, ClockError> {
        (**self).now()
    }

    fn set(&self, at: WallClock) -> Result<(), ClockError> {
        (**self).set(at)
    }
}
