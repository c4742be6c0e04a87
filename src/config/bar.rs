//! Bar and block configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{Interval, RtRange};

/// Scheduler-level options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Accept click events on stdin and advertise them to the bar.
    #[serde(default = "default_click_events")]
    pub click_events: bool,
}

const fn default_click_events() -> bool {
    true
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            click_events: default_click_events(),
        }
    }
}

/// One block of the status line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Block name, reported back in click events.
    pub name: String,
    /// Optional instance, disambiguates blocks sharing a name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Shell command producing the block text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Refresh interval.
    #[serde(default)]
    pub interval: Interval,
    /// Real-time signal offset: `SIGRTMIN + signal` re-runs the block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<u32>,
    /// Prefix prepended to the text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Static text shown until the command first produces output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    /// Default text color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Root configuration: scheduler options and the ordered blocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BarConfig {
    /// Scheduler options.
    #[serde(flatten)]
    pub scheduler: SchedulerConfig,
    /// Blocks in display order.
    #[serde(default)]
    pub blocks: Vec<BlockConfig>,
}

impl BlockConfig {
    /// Validate one block against the platform's real-time range.
    pub fn validate(&self, rt: RtRange) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".into());
        }
        let has_command = self.command.as_deref().is_some_and(|c| !c.trim().is_empty());
        if self.interval.runs_at_startup() && !has_command {
            return Err(format!("interval `{}` requires a command", self.interval));
        }
        if let Some(signal) = self.signal {
            if signal == 0 || signal > rt.max_offset() {
                return Err(format!(
                    "signal must be between 1 and {}, got {signal}",
                    rt.max_offset()
                ));
            }
            if !has_command {
                return Err("signal requires a command".into());
            }
        }
        Ok(())
    }
}

impl BarConfig {
    /// Validate every block.
    pub fn validate(&self) -> Result<(), String> {
        let rt = RtRange::platform();
        for (index, block) in self.blocks.iter().enumerate() {
            block
                .validate(rt)
                .map_err(|e| format!("block #{index} `{}` invalid: {e}", block.name))?;
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a configuration file.
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let input = fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        Self::from_json_str(&input)
    }

    /// Intervals in block order.
    pub fn intervals(&self) -> impl Iterator<Item = Interval> + '_ {
        self.blocks.iter().map(|b| b.interval)
    }
}

/// `$XDG_CONFIG_HOME/barsched/config.json`, else `$HOME/.config/barsched/config.json`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("barsched").join("config.json"))
}
