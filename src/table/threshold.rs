use std::fmt;

use crate::log::log_level::LogLevel;

/// Minimum severity recorded for a sink.
///
/// Only the integer matters; the table places no range on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThresholdLevel(pub i32);

impl ThresholdLevel {
    /// Most permissive standard threshold, used when no level is given.
    pub const DEFAULT: ThresholdLevel = ThresholdLevel(LogLevel::Debug.threshold());
}

impl Default for ThresholdLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<i32> for ThresholdLevel {
    fn from(v: i32) -> Self {
        Self(v)
    }
}

impl From<LogLevel> for ThresholdLevel {
    fn from(lvl: LogLevel) -> Self {
        Self(lvl.threshold())
    }
}

impl fmt::Display for ThresholdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
