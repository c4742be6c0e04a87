//! Translation of raw signal records into scheduler events.

use std::ops::RangeInclusive;

/// One record read from a signal source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalRecord {
    /// Raw signal number.
    pub signo: i32,
    /// Sending process, 0 when not applicable.
    pub pid: u32,
}

/// The platform's real-time signal range.
///
/// `base` is reserved. Signals in `base + 1 ..= max` target blocks by
/// their offset from `base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtRange {
    base: i32,
    max: i32,
}

impl RtRange {
    /// Build a range from explicit bounds.
    #[must_use]
    pub const fn new(base: i32, max: i32) -> Self {
        Self { base, max }
    }

    /// `SIGRTMIN ..= SIGRTMAX` as reported by the C library at runtime.
    #[must_use]
    pub fn platform() -> Self {
        Self::new(libc::SIGRTMIN(), libc::SIGRTMAX())
    }

    /// The reserved first real-time signal.
    #[must_use]
    pub const fn base(self) -> i32 {
        self.base
    }

    /// The last real-time signal.
    #[must_use]
    pub const fn max(self) -> i32 {
        self.max
    }

    /// Signals that may target blocks.
    #[must_use]
    pub const fn block_signals(self) -> RangeInclusive<i32> {
        (self.base + 1)..=self.max
    }

    /// Largest valid block offset.
    #[must_use]
    pub const fn max_offset(self) -> u32 {
        self.max.abs_diff(self.base)
    }

    /// Offset of `signo` from the base, if it targets a block.
    #[must_use]
    pub const fn offset(self, signo: i32) -> Option<u32> {
        if signo > self.base && signo <= self.max {
            Some(signo.abs_diff(self.base))
        } else {
            None
        }
    }
}

/// Everything the reactor reacts to on the signal descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedEvent {
    /// SIGTERM or SIGINT.
    Terminate(i32),
    /// The periodic timer expired.
    TimerTick,
    /// At least one child changed state.
    ChildExited,
    /// Input is ready on stdin.
    ClickReady,
    /// A real-time signal for the blocks bound to this offset.
    BlockSignaled(u32),
    /// SIGUSR1 or SIGUSR2, accepted but no longer acted upon.
    Deprecated(i32),
    /// Anything else.
    Unknown(i32),
}

impl SchedEvent {
    /// Translate a raw signal number.
    #[must_use]
    pub fn from_signo(signo: i32, rt: RtRange) -> Self {
        match signo {
            libc::SIGTERM | libc::SIGINT => Self::Terminate(signo),
            libc::SIGALRM => Self::TimerTick,
            libc::SIGCHLD => Self::ChildExited,
            libc::SIGIO => Self::ClickReady,
            libc::SIGUSR1 | libc::SIGUSR2 => Self::Deprecated(signo),
            _ => rt
                .offset(signo)
                .map_or(Self::Unknown(signo), Self::BlockSignaled),
        }
    }

    /// Translate a record read from a signal source.
    #[must_use]
    pub fn from_record(record: SignalRecord, rt: RtRange) -> Self {
        Self::from_signo(record.signo, rt)
    }
}

/// Human-readable name for diagnostics.
#[must_use]
pub fn signal_name(signo: i32) -> String {
    signal_hook::low_level::signal_name(signo).map_or_else(
        || {
            let rt = RtRange::platform();
            if signo >= rt.base() && signo <= rt.max() {
                format!("SIGRTMIN+{}", signo - rt.base())
            } else {
                format!("signal {signo}")
            }
        },
        str::to_owned,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const RT: RtRange = RtRange::new(34, 64);

    #[test]
    fn test_fixed_signals() {
        assert_eq!(SchedEvent::from_signo(libc::SIGTERM, RT), SchedEvent::Terminate(libc::SIGTERM));
        assert_eq!(SchedEvent::from_signo(libc::SIGINT, RT), SchedEvent::Terminate(libc::SIGINT));
        assert_eq!(SchedEvent::from_signo(libc::SIGALRM, RT), SchedEvent::TimerTick);
        assert_eq!(SchedEvent::from_signo(libc::SIGCHLD, RT), SchedEvent::ChildExited);
        assert_eq!(SchedEvent::from_signo(libc::SIGIO, RT), SchedEvent::ClickReady);
        assert_eq!(SchedEvent::from_signo(libc::SIGUSR2, RT), SchedEvent::Deprecated(libc::SIGUSR2));
        assert_eq!(SchedEvent::from_signo(libc::SIGHUP, RT), SchedEvent::Unknown(libc::SIGHUP));
    }

    #[test]
    fn test_realtime_offsets() {
        assert_eq!(SchedEvent::from_signo(34, RT), SchedEvent::Unknown(34));
        assert_eq!(SchedEvent::from_signo(35, RT), SchedEvent::BlockSignaled(1));
        assert_eq!(SchedEvent::from_signo(64, RT), SchedEvent::BlockSignaled(30));
        assert_eq!(SchedEvent::from_signo(65, RT), SchedEvent::Unknown(65));
        assert_eq!(RT.max_offset(), 30);
        assert_eq!(RT.block_signals(), 35..=64);
    }

    #[test]
    fn test_signal_name() {
        assert_eq!(signal_name(libc::SIGTERM), "SIGTERM");
        let rt = RtRange::platform();
        assert_eq!(signal_name(rt.base() + 3), "SIGRTMIN+3");
    }
}
