//! Click events read from the bar on stdin.
//!
//! The bar writes an endless JSON array, one object per line:
//!
//! ```text
//! [
//! {"name":"volume","instance":"master","button":1,"x":1320,"y":1400}
//! ,{"name":"time","button":3,"x":1700,"y":1400}
//! ```

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read};

use serde::Deserialize;
use tracing::warn;

/// One click on a block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClickEvent {
    /// Name of the clicked block.
    #[serde(default)]
    pub name: Option<String>,
    /// Instance of the clicked block.
    #[serde(default)]
    pub instance: Option<String>,
    /// Mouse button.
    #[serde(default)]
    pub button: u32,
    /// Pointer X coordinate.
    #[serde(default)]
    pub x: i32,
    /// Pointer Y coordinate.
    #[serde(default)]
    pub y: i32,
}

/// Incremental parser over the click stream.
#[derive(Debug, Default)]
pub struct ClickReader {
    pending: Vec<u8>,
    events: VecDeque<ClickEvent>,
    eof: bool,
}

impl ClickReader {
    /// Empty reader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the input reached end of file.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.eof
    }

    /// Append raw bytes and parse every complete line.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.parse_line(&line[..pos]);
        }
    }

    /// Read whatever the input holds without blocking, then parse it.
    ///
    /// Returns the number of bytes read.
    ///
    /// # Errors
    ///
    /// Read errors other than `WouldBlock` and `Interrupted`.
    pub fn read_from<R: Read>(&mut self, input: &mut R) -> io::Result<usize> {
        let mut buf = [0u8; 1024];
        let mut total = 0;
        loop {
            match input.read(&mut buf) {
                Ok(0) => {
                    self.eof = true;
                    break;
                }
                Ok(n) => {
                    total += n;
                    self.feed(&buf[..n]);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(total)
    }

    /// Next parsed event.
    pub fn next_event(&mut self) -> Option<ClickEvent> {
        self.events.pop_front()
    }

    fn parse_line(&mut self, raw: &[u8]) {
        let text = String::from_utf8_lossy(raw);
        let line = text.trim().trim_start_matches(',').trim_start();
        if line.is_empty() || line == "[" {
            return;
        }
        match serde_json::from_str::<ClickEvent>(line) {
            Ok(event) => self.events.push_back(event),
            Err(err) => warn!(%err, line, "malformed click event"),
        }
    }
}
