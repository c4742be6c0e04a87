//! # barsched
//!
//! A signal-driven scheduler for status-line blocks.
//!
//! A status line is made of blocks. Each block runs a shell command on its
//! own schedule: every `n` seconds, once at startup, continuously while the
//! command streams lines, or only when clicked or signaled. The scheduler
//! runs all of them from a single thread that blocks in one place.
//!
//! ## How it works
//!
//! - **One timer**: the GCD of every periodic interval becomes the period of
//!   a single POSIX timer ([`core::reduce_period`], [`sys::PeriodicTimer`]).
//! - **One descriptor for all signals**: termination, timer, child-exit,
//!   click and real-time signals are blocked and read as records from a
//!   signalfd ([`sys::SignalGate`]).
//! - **One wait**: the reactor polls the signal descriptor together with the
//!   pipes of every persistent block and routes each wake-up to the bar
//!   ([`core::Scheduler`], [`core::BarDriver`]).
//! - **Clean exit**: whatever ends the loop, signal delivery is restored and
//!   every child is reaped before `start` returns.
//!
//! ```rust,no_run
//! use barsched::builders::build_bar;
//! use barsched::config::BarConfig;
//! use barsched::core::Scheduler;
//!
//! # fn main() -> barsched::core::AppResult<()> {
//! let cfg = BarConfig::from_json_str(
//!     r#"{"blocks":[{"name":"time","command":"date +%T","interval":1}]}"#,
//! )
//! .map_err(anyhow::Error::msg)?;
//! let mut bar = build_bar(&cfg)?;
//! let mut scheduler = Scheduler::init(&bar, &cfg.scheduler)?;
//! scheduler.start(&mut bar)?;
//! # Ok(())
//! # }
//! ```
//!
//! Linux only: the gate relies on `signalfd(2)`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling: intervals, events, the wait set and the reactor.
pub mod core;
/// Configuration models for the bar and its blocks.
pub mod config;
/// Builders to construct a bar from configuration.
pub mod builders;
/// The production bar: block processes, rendering and clicks.
pub mod bar;
/// Linux signal, timer and descriptor plumbing.
pub mod sys;
/// Shared utilities.
pub mod util;
