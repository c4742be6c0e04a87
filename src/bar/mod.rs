//! The bar runtime: blocks, their processes, rendering and clicks.
//!
//! [`Bar`] is the production [`BarDriver`]. It owns every block's child
//! process and pipes, writes status lines to stdout and reads click
//! events from stdin.

pub mod block;
pub mod click;
pub mod render;
pub mod stream;

use std::io::{self, Read, Stdin, Stdout, Write};
use std::os::fd::BorrowedFd;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::config::BarConfig;
use crate::core::{BarDriver, DueTrigger, Interval, Readiness, Stream};

pub use block::{Block, BlockOutput, Exit, TICK_SLACK, URGENT_EXIT_CODE};
pub use click::{ClickEvent, ClickReader};
pub use render::{BarItem, Renderer};
pub use stream::{set_nonblocking, LineStream, Pump};

/// Ordered blocks plus the bar's input and output.
#[derive(Debug)]
pub struct Bar<W = Stdout, R = Stdin> {
    blocks: Vec<Block>,
    renderer: Renderer<W>,
    input: R,
    clicks: ClickReader,
    eof_logged: bool,
}

impl Bar {
    /// Bar writing to stdout and reading clicks from stdin.
    #[must_use]
    pub fn new(config: &BarConfig) -> Self {
        Self::with_io(config, io::stdout(), io::stdin())
    }
}

impl<W: Write, R: Read> Bar<W, R> {
    /// Bar over explicit output and click input.
    pub fn with_io(config: &BarConfig, out: W, input: R) -> Self {
        Self {
            blocks: config.blocks.iter().cloned().map(Block::new).collect(),
            renderer: Renderer::new(out, config.scheduler.click_events),
            input,
            clicks: ClickReader::new(),
            eof_logged: false,
        }
    }

    /// Blocks in display order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The renderer.
    pub const fn renderer(&self) -> &Renderer<W> {
        &self.renderer
    }

    fn spawn(&mut self, index: usize, click: Option<&ClickEvent>) {
        let Some(block) = self.blocks.get_mut(index) else {
            return;
        };
        if let Err(err) = block.spawn(click) {
            error!(block = %block.name(), %err, "failed to spawn");
        }
    }
}

impl<W: Write, R: Read> BarDriver for Bar<W, R> {
    fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn interval(&self, block: usize) -> Interval {
        self.blocks.get(block).map_or(Interval::Never, Block::interval)
    }

    fn stream_fd(&self, block: usize, stream: Stream) -> Option<BorrowedFd<'_>> {
        self.blocks.get(block)?.stream_fd(stream)
    }

    fn render(&mut self) {
        if let Err(err) = self.renderer.render(&self.blocks) {
            warn!(%err, "failed to write status line");
        }
    }

    fn run_due(&mut self, trigger: DueTrigger) {
        let now = Instant::now();
        let due: Vec<usize> = self
            .blocks
            .iter()
            .enumerate()
            .filter(|(_, block)| match trigger {
                DueTrigger::Startup => block.interval().runs_at_startup(),
                DueTrigger::Tick => block.is_due(now),
            })
            .map(|(index, _)| index)
            .collect();
        debug!(?trigger, due = due.len(), "running due blocks");
        for index in due {
            self.spawn(index, None);
        }
    }

    fn reap_exited(&mut self) {
        for block in &mut self.blocks {
            match block.try_reap() {
                // Failed runs leave the block usable.
                Ok(Some(exit)) if !exit.is_ok() => {
                    let stderr = exit.stderr.trim();
                    if stderr.is_empty() {
                        error!(block = %block.name(), status = %exit.status, "command failed");
                    } else {
                        error!(block = %block.name(), status = %exit.status, "command failed: {stderr}");
                    }
                }
                Ok(_) => {}
                Err(err) => error!(block = %block.name(), %err, "failed to collect child"),
            }
        }
    }

    fn dispatch_click(&mut self) {
        if let Err(err) = self.clicks.read_from(&mut self.input) {
            warn!(%err, "failed to read click events");
        }
        if self.clicks.is_eof() && !self.eof_logged {
            info!("click input closed");
            self.eof_logged = true;
        }

        while let Some(click) = self.clicks.next_event() {
            let target = self
                .blocks
                .iter()
                .position(|b| b.matches(click.name.as_deref(), click.instance.as_deref()));
            let Some(index) = target else {
                debug!(name = ?click.name, instance = ?click.instance, "click on unknown block");
                continue;
            };
            if self.blocks[index].interval().is_persistent() {
                debug!(block = %self.blocks[index].name(), "ignoring click on persistent block");
                continue;
            }
            self.spawn(index, Some(&click));
        }
    }

    fn dispatch_signal(&mut self, offset: u32) {
        let targets: Vec<usize> = self
            .blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.config().signal == Some(offset))
            .map(|(index, _)| index)
            .collect();
        if targets.is_empty() {
            debug!(offset, "no block bound to signal");
        }
        for index in targets {
            self.spawn(index, None);
        }
    }

    fn consume_stream(&mut self, block: usize, eof: bool, ready: Readiness) {
        let Some(target) = self.blocks.get_mut(block) else {
            return;
        };
        if target.is_broken() && !eof {
            target.close_streams();
            return;
        }
        match target.consume(eof, ready) {
            Ok(_) => {}
            Err(err) if eof => {
                debug!(block = %target.name(), %err, "read failed while closing streams");
                target.close_streams();
            }
            Err(err) => {
                let message = format!("failed to read stream: {err}");
                self.report_error(block, &message);
                if let Some(target) = self.blocks.get_mut(block) {
                    target.close_streams();
                }
            }
        }
    }

    fn report_error(&mut self, block: usize, message: &str) {
        let Some(target) = self.blocks.get_mut(block) else {
            error!(block, "{message}");
            return;
        };
        error!(block = %target.name(), "{message}");
        target.mark_broken();
    }

    fn stop(&mut self) {
        for block in &mut self.blocks {
            block.stop();
        }
    }
}
