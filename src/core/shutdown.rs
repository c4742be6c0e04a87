//! Child reaping at the end of the process.

use nix::errno::Errno;
use nix::sys::wait::waitpid;
use nix::unistd::Pid;
use tracing::{debug, warn};

/// Wait for every child of this process, discarding statuses.
///
/// Returns once no child remains. Interrupted waits are retried.
pub fn reap_children() -> usize {
    let mut reaped = 0;
    loop {
        match waitpid(Pid::from_raw(-1), None) {
            Ok(status) => {
                debug!(?status, "reaped child");
                reaped += 1;
            }
            Err(Errno::EINTR) => {}
            Err(Errno::ECHILD) => break,
            Err(errno) => {
                warn!(%errno, "waitpid failed");
                break;
            }
        }
    }
    reaped
}
