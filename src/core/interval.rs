//! Block refresh intervals and the timer period reduction.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How often a block's command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RawInterval", into = "RawInterval")]
pub enum Interval {
    /// Only on signal or click.
    #[default]
    Never,
    /// Once at startup.
    Once,
    /// Long-running command streaming output line by line.
    Persist,
    /// Every `n` seconds, `n > 0`.
    Every(u32),
}

impl Interval {
    /// Positive period in seconds, if this is a periodic interval.
    #[must_use]
    pub const fn secs(self) -> Option<u32> {
        match self {
            Self::Every(n) if n > 0 => Some(n),
            _ => None,
        }
    }

    /// Whether the block streams output continuously.
    #[must_use]
    pub const fn is_persistent(self) -> bool {
        matches!(self, Self::Persist)
    }

    /// Whether the block runs on its own at startup.
    #[must_use]
    pub const fn runs_at_startup(self) -> bool {
        !matches!(self, Self::Never)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => write!(f, "0"),
            Self::Once => write!(f, "once"),
            Self::Persist => write!(f, "persist"),
            Self::Every(n) => write!(f, "{n}"),
        }
    }
}

/// Wire form of [`Interval`]: a number of seconds or a keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawInterval {
    Secs(u32),
    Keyword(String),
}

impl TryFrom<RawInterval> for Interval {
    type Error = String;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        match raw {
            RawInterval::Secs(0) => Ok(Self::Never),
            RawInterval::Secs(n) => Ok(Self::Every(n)),
            RawInterval::Keyword(word) => match word.as_str() {
                "once" => Ok(Self::Once),
                "persist" => Ok(Self::Persist),
                other => Err(format!("unknown interval `{other}`")),
            },
        }
    }
}

impl From<Interval> for RawInterval {
    fn from(interval: Interval) -> Self {
        match interval {
            Interval::Never => Self::Secs(0),
            Interval::Every(n) => Self::Secs(n),
            Interval::Once | Interval::Persist => Self::Keyword(interval.to_string()),
        }
    }
}

/// Greatest common divisor. `gcd(a, 0) == a`.
#[must_use]
pub const fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// The coarsest timer period that evenly divides every positive interval.
///
/// Returns 0 when no interval is periodic, meaning no timer is needed.
pub fn reduce_period<I>(intervals: I) -> u32
where
    I: IntoIterator<Item = Interval>,
{
    intervals
        .into_iter()
        .filter_map(Interval::secs)
        .fold(0, gcd)
}
