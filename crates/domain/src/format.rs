//! Output encoding and timestamp format selections.

use crate::PrimitiveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Encoding an adapter applies to each event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatMode {
    /// `<time> [<LEVEL>] [<file>:<line>] <body>`.
    #[default]
    Plain,
    /// One JSON object per event.
    Json,
}

impl FormatMode {
    /// Lower-case mode name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for FormatMode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for FormatMode {
    type Err = PrimitiveError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            _ => Err(PrimitiveError::InvalidFormatMode {
                input: input.trim().to_owned(),
            }),
        }
    }
}

/// Timestamp rendering used for `create_time`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum TimeFormat {
    /// `2006-01-02 15:04:05`.
    DashSecond,
    /// `2006/01/02 15:04:05`.
    SlashSecond,
    /// `2006-01-02 15:04:05.000`.
    #[default]
    DashMillisecond,
    /// `2006/01/02 15:04:05.000`.
    SlashMillisecond,
    /// Arbitrary strftime pattern.
    Custom(Box<str>),
}

impl TimeFormat {
    /// strftime pattern for this format.
    #[must_use]
    pub fn pattern(&self) -> &str {
        match self {
            Self::DashSecond => "%Y-%m-%d %H:%M:%S",
            Self::SlashSecond => "%Y/%m/%d %H:%M:%S",
            Self::DashMillisecond => "%Y-%m-%d %H:%M:%S%.3f",
            Self::SlashMillisecond => "%Y/%m/%d %H:%M:%S%.3f",
            Self::Custom(pattern) => pattern,
        }
    }

    /// Parse a preset name or fall back to a custom pattern.
    pub fn parse(input: &str) -> Result<Self, PrimitiveError> {
        let trimmed = input.trim();
        match trimmed {
            "" => Err(PrimitiveError::EmptyTimeFormat),
            "dashSecond" => Ok(Self::DashSecond),
            "slashSecond" => Ok(Self::SlashSecond),
            "dashMillisecond" => Ok(Self::DashMillisecond),
            "slashMillisecond" => Ok(Self::SlashMillisecond),
            custom => Ok(Self::Custom(custom.into())),
        }
    }

    /// Preset name, or the pattern itself for custom formats.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::DashSecond => "dashSecond",
            Self::SlashSecond => "slashSecond",
            Self::DashMillisecond => "dashMillisecond",
            Self::SlashMillisecond => "slashMillisecond",
            Self::Custom(pattern) => pattern,
        }
    }
}

impl Serialize for TimeFormat {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for TimeFormat {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_mode_parses_names() {
        assert_eq!("JSON".parse::<FormatMode>(), Ok(FormatMode::Json));
        assert_eq!("plain".parse::<FormatMode>(), Ok(FormatMode::Plain));
        assert!("xml".parse::<FormatMode>().is_err());
        assert_eq!(FormatMode::default(), FormatMode::Plain);
    }

    #[test]
    fn time_format_presets_map_to_patterns() {
        assert_eq!(TimeFormat::default().pattern(), "%Y-%m-%d %H:%M:%S%.3f");
        assert_eq!(
            TimeFormat::parse("slashSecond").map(|format| format.pattern().to_owned()),
            Ok("%Y/%m/%d %H:%M:%S".to_owned())
        );
        assert_eq!(
            TimeFormat::parse("%H:%M"),
            Ok(TimeFormat::Custom("%H:%M".into()))
        );
        assert_eq!(TimeFormat::parse("  "), Err(PrimitiveError::EmptyTimeFormat));
    }

    #[test]
    fn time_format_serializes_by_name() -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string(&TimeFormat::SlashMillisecond)?;
        assert_eq!(json, "\"slashMillisecond\"");
        let parsed: TimeFormat = serde_json::from_str("\"dashSecond\"")?;
        assert_eq!(parsed, TimeFormat::DashSecond);
        Ok(())
    }
}
