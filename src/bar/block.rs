//! One block: its configuration, current output and child process.

use std::io;
use std::os::fd::{AsFd, BorrowedFd};
use std::process::{Child, ChildStderr, ChildStdout, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::config::BlockConfig;
use crate::core::{Interval, Readiness, Stream};

use super::click::ClickEvent;
use super::stream::{set_nonblocking, LineStream};

/// Exit code a command uses to flag its block as urgent.
pub const URGENT_EXIT_CODE: i32 = 33;

/// Tolerance when comparing elapsed time to an interval on a timer tick.
///
/// Blocks are first spawned right after the timer is armed, so the
/// elapsed time at an expiry is slightly below a whole multiple of the
/// period.
pub const TICK_SLACK: Duration = Duration::from_millis(500);

/// What a block currently displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockOutput {
    /// Main text.
    pub full_text: String,
    /// Text used when the bar runs out of space.
    pub short_text: Option<String>,
    /// Text color.
    pub color: Option<String>,
    /// Urgency hint.
    pub urgent: bool,
}

impl BlockOutput {
    /// Parse command output: full text, short text, color, one per line.
    #[must_use]
    pub fn from_lines(text: &str) -> Self {
        let mut lines = text.lines().map(str::trim_end);
        let full_text = lines.next().unwrap_or_default().to_owned();
        let short_text = lines.next().filter(|l| !l.is_empty()).map(str::to_owned);
        let color = lines.next().filter(|l| !l.is_empty()).map(str::to_owned);
        Self {
            full_text,
            short_text,
            color,
            urgent: false,
        }
    }
}

/// A finished run of a block's command.
#[derive(Debug)]
pub struct Exit {
    /// Exit status.
    pub status: ExitStatus,
    /// What the command wrote to stderr by the time it exited.
    pub stderr: String,
}

impl Exit {
    /// Success or the urgent code.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.success() || self.status.code() == Some(URGENT_EXIT_CODE)
    }
}

#[derive(Debug, Default)]
struct Streams {
    stdout: Option<LineStream<ChildStdout>>,
    stderr: Option<LineStream<ChildStderr>>,
}

impl Streams {
    fn is_closed(&self) -> bool {
        self.stdout.is_none() && self.stderr.is_none()
    }
}

/// A configured block and its runtime state.
#[derive(Debug)]
pub struct Block {
    config: BlockConfig,
    output: BlockOutput,
    child: Option<Child>,
    streams: Option<Streams>,
    last_spawn: Option<Instant>,
    broken: bool,
}

impl Block {
    /// A block that has not run yet, showing its static text.
    #[must_use]
    pub fn new(config: BlockConfig) -> Self {
        let output = BlockOutput {
            full_text: config.full_text.clone().unwrap_or_default(),
            short_text: None,
            color: None,
            urgent: false,
        };
        Self {
            config,
            output,
            child: None,
            streams: None,
            last_spawn: None,
            broken: false,
        }
    }

    /// Block configuration.
    #[must_use]
    pub const fn config(&self) -> &BlockConfig {
        &self.config
    }

    /// Block name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Refresh interval.
    #[must_use]
    pub const fn interval(&self) -> Interval {
        self.config.interval
    }

    /// Current output.
    #[must_use]
    pub const fn output(&self) -> &BlockOutput {
        &self.output
    }

    /// Whether the command is running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.child.is_some()
    }

    /// Whether a stream error was reported against this block.
    #[must_use]
    pub const fn is_broken(&self) -> bool {
        self.broken
    }

    /// Mark the block broken after a stream error; its pipes are
    /// finalized once and never read again.
    pub fn mark_broken(&mut self) {
        self.broken = true;
    }

    /// Whether a click or signal event addresses this block.
    #[must_use]
    pub fn matches(&self, name: Option<&str>, instance: Option<&str>) -> bool {
        name == Some(self.config.name.as_str()) && instance == self.config.instance.as_deref()
    }

    /// Whether a periodic block should run on this tick.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        let Some(secs) = self.config.interval.secs() else {
            return false;
        };
        if self.is_running() {
            return false;
        }
        self.last_spawn.is_none_or(|at| {
            now.saturating_duration_since(at) + TICK_SLACK >= Duration::from_secs(u64::from(secs))
        })
    }

    /// Live descriptor of a persistent block's stream.
    #[must_use]
    pub fn stream_fd(&self, stream: Stream) -> Option<BorrowedFd<'_>> {
        let streams = self.streams.as_ref()?;
        match stream {
            Stream::Stdout => streams.stdout.as_ref().map(LineStream::as_fd),
            Stream::Stderr => streams.stderr.as_ref().map(LineStream::as_fd),
        }
    }

    /// Drop both pipes of a persistent block without reading them.
    pub fn close_streams(&mut self) {
        if self.streams.take().is_some() {
            debug!(block = %self.config.name, "streams dropped");
        }
    }

    /// Start the command unless it is already running.
    ///
    /// Returns whether a process was started.
    ///
    /// # Errors
    ///
    /// Spawn failures and failures switching the pipes to non-blocking.
    pub fn spawn(&mut self, click: Option<&ClickEvent>) -> io::Result<bool> {
        if self.is_running() {
            debug!(block = %self.config.name, "already running");
            return Ok(false);
        }
        let Some(command) = self.config.command.as_deref() else {
            return Ok(false);
        };

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .env("BLOCK_NAME", &self.config.name)
            .env("BLOCK_INSTANCE", self.config.instance.as_deref().unwrap_or_default())
            .env("BLOCK_INTERVAL", self.config.interval.to_string());
        if let Some(click) = click {
            cmd.env("BLOCK_BUTTON", click.button.to_string())
                .env("BLOCK_X", click.x.to_string())
                .env("BLOCK_Y", click.y.to_string());
        }

        let mut child = cmd.spawn()?;
        // Background jobs of a command may inherit its pipes.
        if let Some(out) = &child.stdout {
            set_nonblocking(out.as_fd())?;
        }
        if let Some(err) = &child.stderr {
            set_nonblocking(err.as_fd())?;
        }
        if self.config.interval.is_persistent() {
            self.streams = Some(Streams {
                stdout: child.stdout.take().map(LineStream::new),
                stderr: child.stderr.take().map(LineStream::new),
            });
        }

        debug!(block = %self.config.name, pid = child.id(), clicked = click.is_some(), "spawned");
        self.child = Some(child);
        self.last_spawn = Some(Instant::now());
        Ok(true)
    }

    /// Collect the child if it exited and update the output.
    ///
    /// Only output already in the pipes is read.
    ///
    /// # Errors
    ///
    /// `try_wait` failures and failures reading the finished command's pipes.
    pub fn try_reap(&mut self) -> io::Result<Option<Exit>> {
        let Some(status) = self.child.as_mut().map(Child::try_wait).transpose()?.flatten() else {
            return Ok(None);
        };
        let Some(mut child) = self.child.take() else {
            return Ok(None);
        };

        let stdout = drain(child.stdout.take())?;
        let stderr = drain(child.stderr.take())?;

        let exit = Exit { status, stderr };
        if self.config.interval.is_persistent() {
            self.consume(true, Readiness { stdout: true, stderr: true })?;
        } else if exit.is_ok() {
            self.output = BlockOutput::from_lines(&stdout);
            self.output.urgent = status.code() == Some(URGENT_EXIT_CODE);
        }
        debug!(block = %self.config.name, %status, "exited");
        Ok(Some(exit))
    }

    /// Consume persistent stream data. Each complete stdout line replaces
    /// the text; stderr lines are logged.
    ///
    /// Returns whether the output changed.
    ///
    /// # Errors
    ///
    /// Read failures other than `WouldBlock`.
    pub fn consume(&mut self, eof: bool, ready: Readiness) -> io::Result<bool> {
        let Some(streams) = self.streams.as_mut() else {
            return Ok(false);
        };
        let mut changed = false;

        if ready.stdout || eof {
            if let Some(out) = streams.stdout.as_mut() {
                let pump = out.pump()?;
                let flushed = if eof || pump.eof { out.flush() } else { None };
                if let Some(last) = pump.lines.into_iter().chain(flushed).last() {
                    self.output.full_text = last;
                    changed = true;
                }
                if eof || pump.eof {
                    streams.stdout = None;
                }
            }
        }

        if ready.stderr || eof {
            if let Some(err) = streams.stderr.as_mut() {
                let pump = err.pump()?;
                let flushed = if eof || pump.eof { err.flush() } else { None };
                for line in pump.lines.into_iter().chain(flushed) {
                    warn!(block = %self.config.name, "{line}");
                }
                if eof || pump.eof {
                    streams.stderr = None;
                }
            }
        }

        if streams.is_closed() {
            debug!(block = %self.config.name, "streams closed");
            self.streams = None;
        }
        Ok(changed)
    }

    /// Terminate a running child and close its pipes.
    pub fn stop(&mut self) {
        self.streams = None;
        let Some(child) = &self.child else {
            return;
        };
        match i32::try_from(child.id()) {
            Ok(pid) => {
                if let Err(errno) = kill(Pid::from_raw(pid), Signal::SIGTERM) {
                    debug!(block = %self.config.name, %errno, "kill failed");
                }
            }
            Err(_) => warn!(block = %self.config.name, "pid out of range"),
        }
    }
}

fn drain<R: io::Read>(pipe: Option<R>) -> io::Result<String> {
    let lines = pipe.map(|p| LineStream::new(p).drain()).transpose()?;
    Ok(lines.unwrap_or_default().join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn every(secs: u32) -> Block {
        Block::new(BlockConfig {
            name: "b".into(),
            command: Some("true".into()),
            interval: Interval::Every(secs),
            ..BlockConfig::default()
        })
    }

    #[test]
    fn test_output_lines() {
        let out = BlockOutput::from_lines("full\nshort\n#FF0000\nignored\n");
        assert_eq!(out.full_text, "full");
        assert_eq!(out.short_text.as_deref(), Some("short"));
        assert_eq!(out.color.as_deref(), Some("#FF0000"));

        let empty = BlockOutput::from_lines("");
        assert_eq!(empty, BlockOutput::default());
    }

    #[test]
    fn test_due_with_slack() {
        let mut block = every(2);
        let now = Instant::now();
        assert!(block.is_due(now));

        block.last_spawn = Some(now);
        assert!(!block.is_due(now + Duration::from_secs(1)));
        assert!(block.is_due(now + Duration::from_millis(1_990)));
        assert!(block.is_due(now + Duration::from_secs(3)));
    }

    #[test]
    fn test_non_periodic_never_due() {
        let block = Block::new(BlockConfig {
            name: "once".into(),
            command: Some("true".into()),
            interval: Interval::Once,
            ..BlockConfig::default()
        });
        assert!(!block.is_due(Instant::now()));
    }

    #[test]
    fn test_static_text_and_matching() {
        let block = Block::new(BlockConfig {
            name: "vol".into(),
            instance: Some("master".into()),
            full_text: Some("loading".into()),
            ..BlockConfig::default()
        });
        assert_eq!(block.output().full_text, "loading");
        assert!(block.matches(Some("vol"), Some("master")));
        assert!(!block.matches(Some("vol"), None));
        assert!(!block.matches(None, Some("master")));
    }
}
