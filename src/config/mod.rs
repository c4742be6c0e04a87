//! Configuration models for the bar, its blocks and the scheduler.

pub mod bar;

pub use bar::{default_config_path, BarConfig, BlockConfig, SchedulerConfig};
