//! The scheduler: a single-threaded reactor over signals and block streams.
//!
//! [`Scheduler::init`] installs the signal gate, arms the shared timer and
//! switches stdin to signal-driven mode. [`Scheduler::start`] renders once,
//! runs the blocks due at startup and then waits on the signal descriptor
//! plus every persistent block's streams. Each wake-up handles at most one
//! signal record, then sweeps readable block streams, rendering once per
//! sweep. Whatever ends the loop, the shutdown sequence runs before
//! `start` returns: the timer is disarmed, signal delivery is restored and
//! every child is reaped.

use std::collections::BTreeMap;
use std::ops::ControlFlow;

use nix::errno::Errno;
use tracing::{debug, error, info, warn};

use crate::config::SchedulerConfig;
use crate::sys::{enable_async_stdin, stdin_is_terminal, PeriodicTimer, SignalGate};

use super::driver::{BarDriver, DueTrigger, Readiness, SignalSource};
use super::event::{signal_name, SchedEvent};
use super::interval::reduce_period;
use super::shutdown::reap_children;
use super::wait_set::{Ready, WaitSet, Watch};
use super::SchedError;

/// Reactor context: the signal source and the shared timer.
#[derive(Debug)]
pub struct Scheduler<S> {
    signals: S,
    timer: Option<PeriodicTimer>,
}

impl Scheduler<SignalGate> {
    /// Gate the signal set, arm the timer for the bar's intervals and, when
    /// stdin is not a terminal, enable signal-driven stdin.
    ///
    /// # Errors
    ///
    /// Any startup failure; nothing has been spawned yet.
    pub fn init<B>(bar: &B, config: &SchedulerConfig) -> Result<Self, SchedError>
    where
        B: BarDriver + ?Sized,
    {
        let signals = SignalGate::install()?;

        let period = reduce_period((0..bar.block_count()).map(|i| bar.interval(i)));
        let timer = PeriodicTimer::arm(period)?;

        if config.click_events && !stdin_is_terminal() {
            enable_async_stdin()?;
        }

        Ok(Self { signals, timer })
    }
}

impl<S: SignalSource> Scheduler<S> {
    /// Use an already prepared signal source and no timer.
    pub const fn with_source(signals: S) -> Self {
        Self {
            signals,
            timer: None,
        }
    }

    /// The signal source.
    pub const fn signals(&self) -> &S {
        &self.signals
    }

    /// Timer period in seconds, 0 when no timer is armed.
    pub fn period(&self) -> u32 {
        self.timer.as_ref().map_or(0, PeriodicTimer::period)
    }

    /// Run the reactor until a termination signal, then shut down.
    ///
    /// Returns the terminating signal number.
    ///
    /// # Errors
    ///
    /// A fatal in-loop error. Shutdown has completed either way.
    pub fn start<B>(&mut self, bar: &mut B) -> Result<i32, SchedError>
    where
        B: BarDriver + ?Sized,
    {
        let outcome = self.run(bar);
        match &outcome {
            Ok(signo) => info!(signal = %signal_name(*signo), "terminating"),
            Err(err) => error!(%err, "scheduler loop aborted"),
        }
        self.shutdown(bar);
        outcome
    }

    fn run<B>(&mut self, bar: &mut B) -> Result<i32, SchedError>
    where
        B: BarDriver + ?Sized,
    {
        // Static text and placeholders first, then the first runs.
        bar.render();
        bar.run_due(DueTrigger::Startup);

        let mut wait_set = WaitSet::build(&self.signals, &*bar);
        let rt = self.signals.rt_range();

        loop {
            let ready = match wait_set.wait(&self.signals, &*bar) {
                Ok(ready) => ready,
                // Hiding the bar may interrupt the wait.
                Err(Errno::EINTR) => continue,
                Err(errno) => return Err(SchedError::Wait(errno)),
            };

            if ready.is_empty() {
                return Err(SchedError::EmptyWait);
            }

            for index in broken_blocks(&ready)? {
                bar.report_error(index, "broken stdout/err");
                wait_set.remove_block(index);
                bar.consume_stream(index, true, Readiness::none());
            }

            if ready.iter().any(|r| r.watch == Watch::Signals && r.readable) {
                let record = self.signals.read_record()?;
                debug!(
                    signal = %signal_name(record.signo),
                    pid = record.pid,
                    "received signal"
                );
                let event = SchedEvent::from_record(record, rt);
                if event == SchedEvent::TimerTick {
                    self.log_overruns();
                }
                if let ControlFlow::Break(signo) = dispatch(event, bar) {
                    return Ok(signo);
                }
            }

            let sweep = readable_blocks(&ready, &wait_set);
            if sweep.is_empty() {
                continue;
            }
            for (index, readiness) in sweep {
                bar.consume_stream(index, false, readiness);
            }
            bar.render();
        }
    }

    fn log_overruns(&self) {
        let overruns = self.timer.as_ref().map_or(0, PeriodicTimer::overruns);
        if overruns > 0 {
            debug!(overruns, "timer expirations coalesced");
        }
    }

    fn shutdown<B>(&mut self, bar: &mut B)
    where
        B: BarDriver + ?Sized,
    {
        if let Some(timer) = self.timer.take() {
            debug!(period = timer.period(), "disarming timer");
        }
        // Unblock so later blocking calls can be interrupted normally.
        if let Err(err) = self.signals.release() {
            error!(%err, "failed to restore signal delivery");
        }
        bar.stop();
        let reaped = reap_children();
        debug!(reaped, "quit scheduling");
    }
}

/// Route one signal event. `Break` carries the terminating signal.
fn dispatch<B>(event: SchedEvent, bar: &mut B) -> ControlFlow<i32>
where
    B: BarDriver + ?Sized,
{
    match event {
        SchedEvent::Terminate(signo) => return ControlFlow::Break(signo),
        SchedEvent::TimerTick => bar.run_due(DueTrigger::Tick),
        SchedEvent::ChildExited => {
            bar.reap_exited();
            bar.render();
        }
        SchedEvent::ClickReady => bar.dispatch_click(),
        SchedEvent::BlockSignaled(offset) => bar.dispatch_signal(offset),
        SchedEvent::Deprecated(signo) => {
            warn!(signal = %signal_name(signo), "SIGUSR{{1,2}} are deprecated, ignoring");
        }
        SchedEvent::Unknown(signo) => debug!(signal = %signal_name(signo), "unhandled signal"),
    }
    ControlFlow::Continue(())
}

/// Blocks with a descriptor in error state, in block order.
fn broken_blocks(ready: &[Ready]) -> Result<Vec<usize>, SchedError> {
    let mut broken = Vec::new();
    for r in ready.iter().filter(|r| r.broken) {
        match r.watch {
            Watch::Signals => return Err(SchedError::SignalFdBroken),
            Watch::Block { index, .. } => broken.push(index),
        }
    }
    broken.sort_unstable();
    broken.dedup();
    Ok(broken)
}

/// Readable streams of still-watched blocks, merged per block.
fn readable_blocks(ready: &[Ready], wait_set: &WaitSet) -> BTreeMap<usize, Readiness> {
    let mut sweep: BTreeMap<usize, Readiness> = BTreeMap::new();
    for r in ready.iter().filter(|r| r.readable && !r.broken) {
        if let Watch::Block { index, stream } = r.watch {
            if wait_set.contains(r.fd) {
                sweep.entry(index).or_default().set(stream);
            }
        }
    }
    sweep
}
