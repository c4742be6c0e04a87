//! Non-blocking line reader for block pipes.

use std::io::{self, ErrorKind, Read};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};

use nix::fcntl::{fcntl, FcntlArg, OFlag};

/// Put a descriptor in non-blocking mode.
///
/// # Errors
///
/// The `fcntl` failure as an I/O error.
pub fn set_nonblocking(fd: BorrowedFd<'_>) -> io::Result<()> {
    let raw = fd.as_raw_fd();
    let flags = fcntl(raw, FcntlArg::F_GETFL)?;
    let flags = OFlag::from_bits_truncate(flags) | OFlag::O_NONBLOCK;
    fcntl(raw, FcntlArg::F_SETFL(flags))?;
    Ok(())
}

/// Result of draining a stream.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Pump {
    /// Complete lines, without terminators.
    pub lines: Vec<String>,
    /// The writer side is closed.
    pub eof: bool,
}

/// Splits a non-blocking reader into lines, keeping partial input.
#[derive(Debug)]
pub struct LineStream<R> {
    reader: R,
    pending: Vec<u8>,
}

impl<R: Read> LineStream<R> {
    /// Wrap a reader. The caller sets non-blocking mode.
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new(),
        }
    }

    /// Read everything currently available.
    ///
    /// # Errors
    ///
    /// Any read error other than `WouldBlock` and `Interrupted`.
    pub fn pump(&mut self) -> io::Result<Pump> {
        let mut buf = [0u8; 4096];
        let mut eof = false;
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    eof = true;
                    break;
                }
                Ok(n) => self.pending.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(Pump {
            lines: self.take_lines(),
            eof,
        })
    }

    /// Every line currently available, the partial one included.
    ///
    /// Never waits for other writers still holding the pipe.
    ///
    /// # Errors
    ///
    /// Same as [`LineStream::pump`].
    pub fn drain(mut self) -> io::Result<Vec<String>> {
        let mut lines = self.pump()?.lines;
        lines.extend(self.flush());
        Ok(lines)
    }

    /// The trailing unterminated line, if any.
    pub fn flush(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(decode(&rest))
    }

    fn take_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(decode(&line[..pos]));
        }
        lines
    }
}

impl<R: AsFd> LineStream<R> {
    /// The underlying descriptor.
    pub fn as_fd(&self) -> BorrowedFd<'_> {
        self.reader.as_fd()
    }
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end_matches('\r').to_owned()
}
