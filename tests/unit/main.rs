//! Unit tests for individual components

mod builders_test;
mod click_test;
mod config_test;
mod error_test;
mod event_test;
mod interval_test;
