//! Builders to construct a bar from configuration.

use std::io::{Read, Write};

use tracing::debug;

use crate::bar::Bar;
use crate::config::BarConfig;
use crate::core::SchedError;

/// Validate the configuration and build a bar over stdout and stdin.
///
/// # Errors
///
/// `SchedError::Config` if any block is invalid.
pub fn build_bar(cfg: &BarConfig) -> Result<Bar, SchedError> {
    build_bar_with(cfg, std::io::stdout(), std::io::stdin())
}

/// Validate the configuration and build a bar over explicit I/O.
///
/// # Errors
///
/// `SchedError::Config` if any block is invalid.
pub fn build_bar_with<W, R>(cfg: &BarConfig, out: W, input: R) -> Result<Bar<W, R>, SchedError>
where
    W: Write,
    R: Read,
{
    cfg.validate()
        .map_err(SchedError::Config)?;

    let bar = Bar::with_io(cfg, out, input);
    debug!(
        blocks = cfg.blocks.len(),
        click_events = cfg.scheduler.click_events,
        "bar built"
    );
    Ok(bar)
}
