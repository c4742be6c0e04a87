//! Error types for scheduler operations.

use nix::errno::Errno;
use thiserror::Error;

/// Errors produced by the scheduler and its OS plumbing.
///
/// Startup failures (`SignalSet`, `SignalMask`, `SignalFd`, `Timer`,
/// `AsyncStdin`, `Config`) abort before the reactor runs. The remaining
/// variants end the loop and are returned only after shutdown has reaped
/// every child. Broken block streams are handled inside the loop and never
/// surface here.
#[derive(Debug, Error)]
pub enum SchedError {
    /// A signal could not be added to the gated set.
    #[error("sigaddset({signo}) failed: {source}")]
    SignalSet {
        /// Raw signal number.
        signo: i32,
        /// Underlying OS error.
        #[source]
        source: Errno,
    },
    /// The gated set could not be blocked from asynchronous delivery.
    #[error("sigprocmask failed: {0}")]
    SignalMask(#[source] Errno),
    /// The signal descriptor could not be created.
    #[error("signalfd failed: {0}")]
    SignalFd(#[source] Errno),
    /// The periodic timer could not be created or armed.
    #[error("failed to arm {period}s timer: {source}")]
    Timer {
        /// Requested period in seconds.
        period: u32,
        /// Underlying OS error.
        #[source]
        source: Errno,
    },
    /// Stdin could not be switched to signal-driven mode.
    #[error("failed to enable I/O signaling for stdin: {0}")]
    AsyncStdin(#[source] Errno),
    /// Configuration was rejected.
    #[error("config invalid: {0}")]
    Config(String),
    /// Reading a record from the signal descriptor failed.
    #[error("signal descriptor read failed: {0}")]
    SignalRead(#[source] std::io::Error),
    /// The signal descriptor returned less than one full record.
    #[error("short read from signal descriptor")]
    ShortRead,
    /// The wait primitive reported an error condition on the signal descriptor.
    #[error("signal descriptor reported an error condition")]
    SignalFdBroken,
    /// The wait primitive failed with something other than `EINTR`.
    #[error("poll failed: {0}")]
    Wait(#[source] Errno),
    /// A wait without timeout returned with nothing ready.
    #[error("should not happen: poll returned 0 ready descriptors")]
    EmptyWait,
}

impl SchedError {
    /// Whether this error can only happen before the reactor loop starts.
    #[must_use]
    pub const fn is_startup(&self) -> bool {
        matches!(
            self,
            Self::SignalSet { .. }
                | Self::SignalMask(_)
                | Self::SignalFd(_)
                | Self::Timer { .. }
                | Self::AsyncStdin(_)
                | Self::Config(_)
        )
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
