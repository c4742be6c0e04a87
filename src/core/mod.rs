//! Core scheduling: interval reduction, event translation, the wait set
//! and the reactor loop.

pub mod driver;
pub mod error;
pub mod event;
pub mod interval;
pub mod reactor;
pub mod shutdown;
pub mod wait_set;

pub use driver::{BarDriver, DueTrigger, Readiness, SignalSource, Stream};
pub use error::{AppResult, SchedError};
pub use event::{signal_name, RtRange, SchedEvent, SignalRecord};
pub use interval::{gcd, reduce_period, Interval};
pub use reactor::Scheduler;
pub use shutdown::reap_children;
pub use wait_set::{Ready, WaitSet, Watch};
