//! Signal-driven stdin for click events.

use std::io::IsTerminal;

use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::unistd::getpid;
use tracing::debug;

use crate::core::SchedError;

/// Whether stdin is attached to a terminal.
#[must_use]
pub fn stdin_is_terminal() -> bool {
    std::io::stdin().is_terminal()
}

/// Make this process the SIGIO receiver for stdin and switch stdin to
/// non-blocking, asynchronous mode.
///
/// # Errors
///
/// `AsyncStdin` if either `fcntl` call fails.
#[allow(unsafe_code)]
pub fn enable_async_stdin() -> Result<(), SchedError> {
    // nix has no F_SETOWN wrapper.
    // SAFETY: plain fcntl on the process's stdin with an integer argument.
    let rc = unsafe { libc::fcntl(libc::STDIN_FILENO, libc::F_SETOWN, getpid().as_raw()) };
    Errno::result(rc).map_err(SchedError::AsyncStdin)?;

    let flags = fcntl(libc::STDIN_FILENO, FcntlArg::F_GETFL).map_err(SchedError::AsyncStdin)?;
    let flags = OFlag::from_bits_truncate(flags) | OFlag::O_ASYNC | OFlag::O_NONBLOCK;
    fcntl(libc::STDIN_FILENO, FcntlArg::F_SETFL(flags)).map_err(SchedError::AsyncStdin)?;

    debug!("stdin switched to signal-driven I/O");
    Ok(())
}
