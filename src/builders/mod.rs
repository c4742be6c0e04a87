pub mod bar_builder;

pub use bar_builder::{build_bar, build_bar_with};
