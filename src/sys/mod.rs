//! Linux plumbing behind the scheduler: signal gate, timer, async stdin.

pub mod signal_gate;
pub mod stdin;
pub mod timer;

pub use signal_gate::{gated_signals, SignalGate};
pub use stdin::{enable_async_stdin, stdin_is_terminal};
pub use timer::PeriodicTimer;
