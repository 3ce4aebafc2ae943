//! Severity levels and the per-adapter threshold cell.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::PrimitiveError;

/// Ordered severity level.
///
/// `Off` is only meaningful as a threshold: an adapter at `Off` receives
/// nothing, and events are never logged at `Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Level {
    /// Debug.
    Debug = 1,
    /// Info.
    Info = 2,
    /// Warn.
    Warn = 3,
    /// Error.
    Error = 4,
    /// Fatal.
    Fatal = 5,
    /// Disabled sentinel.
    Off = 6,
}

impl Level {
    /// Every level, lowest first.
    pub const ALL: [Self; 6] = [
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Fatal,
        Self::Off,
    ];

    /// Upper-case level name as rendered in log lines.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
            Self::Off => "OFF",
        }
    }

    /// Numeric value used by the JSON encoding.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Level::as_u8`].
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Debug),
            2 => Some(Self::Info),
            3 => Some(Self::Warn),
            4 => Some(Self::Error),
            5 => Some(Self::Fatal),
            6 => Some(Self::Off),
            _ => None,
        }
    }

    /// Returns true when an event at `event` passes a threshold of `self`.
    #[must_use]
    pub const fn admits(self, event: Self) -> bool {
        !matches!(event, Self::Off) && (self as u8) <= (event as u8)
    }

    /// Parse a level name (case-insensitive, `warning` accepted).
    pub fn parse(input: &str) -> Result<Self, PrimitiveError> {
        let normalized = input.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            "off" => Ok(Self::Off),
            _ => Err(PrimitiveError::InvalidLevel {
                input: input.trim().to_string(),
            }),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = PrimitiveError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

/// Lock-free threshold cell shared between an adapter and its controllers.
#[derive(Debug)]
pub struct AtomicLevel(AtomicU8);

impl AtomicLevel {
    /// Create a cell holding `level`.
    #[must_use]
    pub const fn new(level: Level) -> Self {
        Self(AtomicU8::new(level.as_u8()))
    }

    /// Read the current threshold.
    #[must_use]
    pub fn load(&self) -> Level {
        Level::from_u8(self.0.load(Ordering::Acquire)).unwrap_or(Level::Off)
    }

    /// Replace the threshold.
    pub fn store(&self, level: Level) {
        self.0.store(level.as_u8(), Ordering::Release);
    }
}
