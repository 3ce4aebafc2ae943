//! Rotation policy value types.
//!
//! Policies are mutually exclusive per adapter and fixed at construction.
//! The engine that applies them lives with the file adapter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar bucket size for date rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateGranularity {
    /// One segment per year.
    Year,
    /// One segment per month.
    Month,
    /// One segment per day.
    Day,
    /// One segment per hour.
    Hour,
}

impl DateGranularity {
    /// strftime pattern rendering the bucket key.
    ///
    /// The same key is used for the rotation comparison and for the archive
    /// name, so two instants share a segment exactly when their keys match.
    #[must_use]
    pub const fn bucket_pattern(self) -> &'static str {
        match self {
            Self::Year => "%Y",
            Self::Month => "%Y%m",
            Self::Day => "%Y%m%d",
            Self::Hour => "%Y%m%d%H",
        }
    }

    /// Parse a granularity name.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "y" | "year" => Some(Self::Year),
            "m" | "month" => Some(Self::Month),
            "d" | "day" => Some(Self::Day),
            "h" | "hour" => Some(Self::Hour),
            _ => None,
        }
    }
}

impl fmt::Display for DateGranularity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Hour => "hour",
        })
    }
}

/// Unit applied to a configured maximum size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    /// Bytes.
    B,
    /// Kibibytes.
    #[default]
    Kb,
    /// Mebibytes.
    Mb,
    /// Gibibytes.
    Gb,
    /// Tebibytes.
    Tb,
}

impl SizeUnit {
    /// Number of bytes in one unit.
    #[must_use]
    pub const fn bytes(self) -> u64 {
        match self {
            Self::B => 1,
            Self::Kb => 1 << 10,
            Self::Mb => 1 << 20,
            Self::Gb => 1 << 30,
            Self::Tb => 1 << 40,
        }
    }

    /// Convert `amount` of this unit into bytes, saturating on overflow.
    #[must_use]
    pub const fn to_bytes(self, amount: u64) -> u64 {
        amount.saturating_mul(self.bytes())
    }

    /// Parse a unit name (case-insensitive).
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "b" => Some(Self::B),
            "kb" | "k" => Some(Self::Kb),
            "mb" | "m" => Some(Self::Mb),
            "gb" | "g" => Some(Self::Gb),
            "tb" | "t" => Some(Self::Tb),
            _ => None,
        }
    }
}

/// When the active file segment must be archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationPolicy {
    /// Rotate when the calendar bucket changes.
    Date(DateGranularity),
    /// Rotate when the segment holds at least `max_bytes` bytes.
    Size {
        /// Threshold in bytes.
        max_bytes: u64,
    },
    /// Rotate when the segment holds at least `max_lines` lines.
    Lines {
        /// Threshold in lines.
        max_lines: u64,
    },
}

impl RotationPolicy {
    /// Name of the rolling type as configured.
    #[must_use]
    pub const fn rolling_name(&self) -> &'static str {
        match self {
            Self::Date(_) => "date",
            Self::Size { .. } => "size",
            Self::Lines { .. } => "line",
        }
    }
}

impl fmt::Display for RotationPolicy {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(granularity) => write!(formatter, "date({granularity})"),
            Self::Size { max_bytes } => write!(formatter, "size({max_bytes} bytes)"),
            Self::Lines { max_lines } => write!(formatter, "line({max_lines} lines)"),
        }
    }
}
