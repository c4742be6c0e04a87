//! Collaborator traits driven by the reactor.

use std::os::fd::{AsFd, BorrowedFd};

use super::event::{RtRange, SignalRecord};
use super::interval::Interval;
use super::SchedError;

/// One of a streaming block's two output descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stream {
    /// The command's standard output.
    Stdout,
    /// The command's standard error.
    Stderr,
}

/// Which descriptors of a block were readable in one wake-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    /// Stdout has data or reached end of stream.
    pub stdout: bool,
    /// Stderr has data or reached end of stream.
    pub stderr: bool,
}

impl Readiness {
    /// Nothing ready. Used when a stream is finalized after an error.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            stdout: false,
            stderr: false,
        }
    }

    /// Mark one stream ready.
    pub fn set(&mut self, stream: Stream) {
        match stream {
            Stream::Stdout => self.stdout = true,
            Stream::Stderr => self.stderr = true,
        }
    }
}

/// Why blocks are being checked for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueTrigger {
    /// First pass at reactor start.
    Startup,
    /// Timer expiry.
    Tick,
}

/// The bar as seen by the scheduler.
///
/// The reactor reads intervals and descriptors through this trait and
/// delegates every content change to it. Implementations own the block
/// processes and their pipes; the reactor never closes a descriptor.
pub trait BarDriver {
    /// Number of configured blocks.
    fn block_count(&self) -> usize;

    /// Refresh interval of a block.
    fn interval(&self, block: usize) -> Interval;

    /// Live output descriptor of a streaming block.
    fn stream_fd(&self, block: usize, stream: Stream) -> Option<BorrowedFd<'_>>;

    /// Print the status line. Must not block.
    fn render(&mut self);

    /// Spawn the blocks due for the given trigger.
    fn run_due(&mut self, trigger: DueTrigger);

    /// Collect exited children and update their blocks.
    fn reap_exited(&mut self);

    /// Read a pending click event and run the clicked block.
    fn dispatch_click(&mut self);

    /// Run the blocks bound to real-time signal offset `offset`.
    fn dispatch_signal(&mut self, offset: u32);

    /// Consume available stream data. `eof` closes the streams for good.
    fn consume_stream(&mut self, block: usize, eof: bool, ready: Readiness);

    /// Non-fatal stream failure against one block.
    fn report_error(&mut self, block: usize, message: &str);

    /// Terminate outstanding children before they are reaped at shutdown.
    fn stop(&mut self) {}
}

/// A readable descriptor delivering signals as discrete records.
pub trait SignalSource: AsFd {
    /// Read exactly one record. Called only after the descriptor polled readable.
    ///
    /// # Errors
    ///
    /// `ShortRead` if less than a full record is available, `SignalRead`
    /// on I/O failure.
    fn read_record(&mut self) -> Result<SignalRecord, SchedError>;

    /// Real-time range used to translate records.
    fn rt_range(&self) -> RtRange;

    /// Restore normal signal delivery. Called once during shutdown.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the signal mask cannot be restored.
    fn release(&mut self) -> Result<(), SchedError> {
        Ok(())
    }
}
