//! Periodic SIGALRM timer shared by all interval blocks.

use std::fmt;
use std::time::Duration;

use nix::sys::signal::{SigEvent, SigevNotify, Signal};
use nix::sys::time::TimeSpec;
use nix::sys::timer::{Expiration, Timer, TimerSetTimeFlags};
use nix::time::ClockId;
use tracing::debug;

use crate::core::SchedError;

/// A POSIX interval timer raising SIGALRM every `period` seconds.
///
/// The first expiry is one full period after arming. Dropping the value
/// deletes the timer.
pub struct PeriodicTimer {
    timer: Timer,
    period: u32,
}

impl PeriodicTimer {
    /// Arm a timer, or return `None` when `period` is 0.
    ///
    /// # Errors
    ///
    /// `Timer` if the timer cannot be created or armed.
    pub fn arm(period: u32) -> Result<Option<Self>, SchedError> {
        if period == 0 {
            debug!("no timer needed");
            return Ok(None);
        }

        let err = |source| SchedError::Timer { period, source };
        let event = SigEvent::new(SigevNotify::SigevSignal {
            signal: Signal::SIGALRM,
            si_value: 0,
        });
        let mut timer = Timer::new(ClockId::CLOCK_MONOTONIC, event).map_err(err)?;
        let spec = TimeSpec::from(Duration::from_secs(u64::from(period)));
        timer
            .set(Expiration::Interval(spec), TimerSetTimeFlags::empty())
            .map_err(err)?;

        debug!(period, "starting timer");
        Ok(Some(Self { timer, period }))
    }

    /// Repeat period in seconds.
    #[must_use]
    pub const fn period(&self) -> u32 {
        self.period
    }

    /// Expirations missed since the last delivered signal.
    #[must_use]
    pub fn overruns(&self) -> i32 {
        self.timer.overruns()
    }
}

impl fmt::Debug for PeriodicTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeriodicTimer")
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}
