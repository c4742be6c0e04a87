//! The gated signal set, delivered through a signalfd.

use std::os::fd::{AsFd, BorrowedFd};

use nix::errno::Errno;
use nix::sys::signal::{sigprocmask, SigSet, SigmaskHow, Signal};
use nix::sys::signalfd::{SfdFlags, SignalFd};
use tracing::{debug, warn};

use crate::core::event::{signal_name, RtRange, SignalRecord};
use crate::core::{SchedError, SignalSource};

/// Signals handled by name; the real-time range is added on top.
const FIXED_SIGNALS: [Signal; 7] = [
    // termination
    Signal::SIGTERM,
    Signal::SIGINT,
    // timer
    Signal::SIGALRM,
    // block processes
    Signal::SIGCHLD,
    // deprecated
    Signal::SIGUSR1,
    Signal::SIGUSR2,
    // clicks
    Signal::SIGIO,
];

/// Build the full gated set: the fixed signals plus `SIGRTMIN+1 ..= SIGRTMAX`.
///
/// # Errors
///
/// `SignalSet` if a real-time signal cannot be added.
#[allow(unsafe_code)]
pub fn gated_signals(rt: RtRange) -> Result<SigSet, SchedError> {
    let mut fixed = SigSet::empty();
    for sig in FIXED_SIGNALS {
        fixed.add(sig);
    }

    // nix's `Signal` has no real-time variants, so extend the raw set.
    let mut raw: libc::sigset_t = *fixed.as_ref();
    for signo in rt.block_signals() {
        debug!(signo, name = %signal_name(signo), "provide signal");
        // SAFETY: `raw` is an initialized sigset_t owned by this frame.
        if unsafe { libc::sigaddset(&mut raw, signo) } == -1 {
            return Err(SchedError::SignalSet {
                signo,
                source: Errno::last(),
            });
        }
    }

    // SAFETY: `raw` was produced by sigemptyset/sigaddset only.
    Ok(unsafe { SigSet::from_sigset_t_unchecked(raw) })
}

/// Gated signals read as records from a single descriptor.
///
/// While the gate is installed these signals are blocked and never take
/// their default action; they are only observable through [`SignalGate`]'s
/// descriptor.
#[derive(Debug)]
pub struct SignalGate {
    fd: SignalFd,
    mask: SigSet,
    rt: RtRange,
    blocked: bool,
}

impl SignalGate {
    /// Create the descriptor for the platform set and block the set.
    ///
    /// # Errors
    ///
    /// Any failure building the set, creating the descriptor or blocking
    /// the signals.
    pub fn install() -> Result<Self, SchedError> {
        Self::install_with(RtRange::platform())
    }

    /// Same as [`SignalGate::install`] with an explicit real-time range.
    ///
    /// # Errors
    ///
    /// See [`SignalGate::install`].
    pub fn install_with(rt: RtRange) -> Result<Self, SchedError> {
        let mask = gated_signals(rt)?;
        let fd = SignalFd::with_flags(&mask, SfdFlags::SFD_NONBLOCK | SfdFlags::SFD_CLOEXEC)
            .map_err(SchedError::SignalFd)?;
        sigprocmask(SigmaskHow::SIG_SETMASK, Some(&mask), None).map_err(SchedError::SignalMask)?;

        debug!(rt_base = rt.base(), rt_max = rt.max(), "signal gate installed");
        Ok(Self {
            fd,
            mask,
            rt,
            blocked: true,
        })
    }

    /// The gated set.
    #[must_use]
    pub const fn mask(&self) -> &SigSet {
        &self.mask
    }

    /// Whether the set is still blocked.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Discard queued records without acting on them.
    pub fn drain(&mut self) -> usize {
        let mut dropped = 0;
        while let Ok(Some(info)) = self.fd.read_signal() {
            debug!(signal = %signal_name(signo_of(&info)), "dropping queued signal");
            dropped += 1;
        }
        dropped
    }
}

fn signo_of(info: &libc::signalfd_siginfo) -> i32 {
    i32::try_from(info.ssi_signo).unwrap_or(-1)
}

impl AsFd for SignalGate {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl SignalSource for SignalGate {
    fn read_record(&mut self) -> Result<SignalRecord, SchedError> {
        match self.fd.read_signal() {
            Ok(Some(info)) => Ok(SignalRecord {
                signo: signo_of(&info),
                pid: info.ssi_pid,
            }),
            Ok(None) => Err(SchedError::ShortRead),
            Err(errno) => Err(SchedError::SignalRead(errno.into())),
        }
    }

    fn rt_range(&self) -> RtRange {
        self.rt
    }

    fn release(&mut self) -> Result<(), SchedError> {
        if !self.blocked {
            return Ok(());
        }
        let dropped = self.drain();
        if dropped > 0 {
            warn!(dropped, "discarded queued signals before unblocking");
        }
        sigprocmask(SigmaskHow::SIG_UNBLOCK, Some(&self.mask), None)
            .map_err(SchedError::SignalMask)?;
        self.blocked = false;
        debug!("signal gate released");
        Ok(())
    }
}
