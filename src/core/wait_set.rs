//! Descriptors watched by the reactor.

use std::collections::BTreeMap;
use std::os::fd::{AsFd, AsRawFd, RawFd};

use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use tracing::{debug, trace};

use super::driver::{BarDriver, Stream};

/// Back-reference from a watched descriptor to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Watch {
    /// The signal descriptor.
    Signals,
    /// One output stream of a streaming block.
    Block {
        /// Block index in the bar.
        index: usize,
        /// Which stream.
        stream: Stream,
    },
}

/// Readiness of one descriptor after a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ready {
    /// Descriptor key in the wait set.
    pub fd: RawFd,
    /// Owner of the descriptor.
    pub watch: Watch,
    /// Data or end of stream can be read.
    pub readable: bool,
    /// The descriptor is in an error state.
    pub broken: bool,
}

impl Ready {
    /// Classify raw `poll` results. Hang-up counts as readable, the way
    /// `select` reports end of stream.
    #[must_use]
    pub fn from_revents(fd: RawFd, watch: Watch, revents: PollFlags) -> Self {
        Self {
            fd,
            watch,
            readable: revents.intersects(PollFlags::POLLIN | PollFlags::POLLHUP),
            broken: revents.intersects(PollFlags::POLLERR | PollFlags::POLLNVAL),
        }
    }

    /// Whether the wait reported anything at all for this descriptor.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        self.readable || self.broken
    }
}

/// Descriptors keyed by number, each with its owner.
///
/// Built once when the reactor starts. Entries are only ever removed.
#[derive(Debug, Default)]
pub struct WaitSet {
    entries: BTreeMap<RawFd, Watch>,
}

impl WaitSet {
    /// Watch the signal descriptor and both streams of every persistent block.
    pub fn build<B, F>(signals: &F, bar: &B) -> Self
    where
        B: BarDriver + ?Sized,
        F: AsFd + ?Sized,
    {
        let mut set = Self::default();
        set.entries.insert(signals.as_fd().as_raw_fd(), Watch::Signals);

        for index in 0..bar.block_count() {
            if !bar.interval(index).is_persistent() {
                continue;
            }
            for stream in [Stream::Stdout, Stream::Stderr] {
                if let Some(fd) = bar.stream_fd(index, stream) {
                    set.entries
                        .insert(fd.as_raw_fd(), Watch::Block { index, stream });
                }
            }
        }

        debug!(watched = set.len(), nfds = set.nfds(), "wait set built");
        set
    }

    /// Number of watched descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is watched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest watched descriptor plus one, 0 when empty.
    #[must_use]
    pub fn nfds(&self) -> RawFd {
        self.entries.keys().next_back().map_or(0, |fd| fd + 1)
    }

    /// Whether a descriptor is watched.
    #[must_use]
    pub fn contains(&self, fd: RawFd) -> bool {
        self.entries.contains_key(&fd)
    }

    /// Whether any stream of a block is still watched.
    #[must_use]
    pub fn watches_block(&self, index: usize) -> bool {
        self.entries
            .values()
            .any(|watch| matches!(watch, Watch::Block { index: i, .. } if *i == index))
    }

    /// Stop watching every stream of a block. Returns how many were removed.
    pub fn remove_block(&mut self, index: usize) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, watch| !matches!(watch, Watch::Block { index: i, .. } if *i == index));
        before - self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (RawFd, Watch)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Block without timeout until a descriptor is readable or in error.
    ///
    /// Block descriptors are borrowed from the bar for the duration of the
    /// call; a block whose stream the bar already closed is skipped.
    ///
    /// # Errors
    ///
    /// Returns the `poll` errno, including `EINTR`.
    pub fn wait<B, F>(&self, signals: &F, bar: &B) -> Result<Vec<Ready>, Errno>
    where
        B: BarDriver + ?Sized,
        F: AsFd + ?Sized,
    {
        let mut keys = Vec::with_capacity(self.entries.len());
        let mut fds = Vec::with_capacity(self.entries.len());

        for (&fd, &watch) in &self.entries {
            let borrowed = match watch {
                Watch::Signals => Some(signals.as_fd()),
                Watch::Block { index, stream } => bar.stream_fd(index, stream),
            };
            if let Some(borrowed) = borrowed {
                keys.push((fd, watch));
                fds.push(PollFd::new(borrowed, PollFlags::POLLIN));
            }
        }

        let count = poll(&mut fds, PollTimeout::NONE)?;
        trace!(count, "poll returned");

        Ok(keys
            .into_iter()
            .zip(fds.iter())
            .map(|((fd, watch), pfd)| {
                Ready::from_revents(fd, watch, pfd.revents().unwrap_or_else(PollFlags::empty))
            })
            .filter(Ready::is_actionable)
            .collect())
    }
}
