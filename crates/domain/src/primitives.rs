//! Domain primitives with validated constructors.

use rotolog_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validation failures for domain primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// `AdapterId` is empty after trimming.
    InvalidAdapterId {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// Level name is not one of the known levels.
    InvalidLevel {
        /// Trimmed input that failed to parse.
        input: String,
    },
    /// Format mode is neither `plain` nor `json`.
    InvalidFormatMode {
        /// Trimmed input that failed to parse.
        input: String,
    },
    /// Custom time format pattern is empty.
    EmptyTimeFormat,
}

impl PrimitiveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidAdapterId { .. } => ErrorCode::new("config", "invalid_adapter_id"),
            Self::InvalidLevel { .. } => ErrorCode::new("config", "invalid_level"),
            Self::InvalidFormatMode { .. } => ErrorCode::new("config", "invalid_format"),
            Self::EmptyTimeFormat => ErrorCode::new("config", "invalid_time_format"),
        }
    }
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAdapterId { .. } => formatter.write_str("AdapterId must be non-empty"),
            Self::InvalidLevel { input } => write!(
                formatter,
                "unknown level `{input}` (expected debug, info, warn, error, fatal or off)"
            ),
            Self::InvalidFormatMode { input } => {
                write!(formatter, "unknown format `{input}` (expected plain or json)")
            },
            Self::EmptyTimeFormat => formatter.write_str("time format pattern must be non-empty"),
        }
    }
}

impl std::error::Error for PrimitiveError {}

impl From<PrimitiveError> for ErrorEnvelope {
    fn from(error: PrimitiveError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            PrimitiveError::InvalidAdapterId { input_length } => {
                envelope.with_metadata("input_length", input_length.to_string())
            },
            PrimitiveError::InvalidLevel { input } | PrimitiveError::InvalidFormatMode { input } => {
                envelope.with_metadata("input", input)
            },
            PrimitiveError::EmptyTimeFormat => envelope,
        }
    }
}

/// Caller-supplied identifier of an attached adapter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AdapterId(Box<str>);

impl AdapterId {
    /// Identifier given to the console adapter of the default logger.
    pub const DEFAULT_CONSOLE: &'static str = "defaultConsole";
    /// Identifier given to a file adapter built without an explicit id.
    pub const DEFAULT_FILE: &'static str = "defaultFile";

    /// Parse an `AdapterId` from user input.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PrimitiveError::InvalidAdapterId {
                input_length: raw.len(),
            });
        }

        Ok(Self(trimmed.to_owned().into_boxed_str()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the underlying string.
    #[must_use]
    pub fn into_inner(self) -> Box<str> {
        self.0
    }
}

impl AsRef<str> for AdapterId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for AdapterId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<String> for AdapterId {
    type Error = PrimitiveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<AdapterId> for String {
    fn from(value: AdapterId) -> Self {
        value.into_inner().into_string()
    }
}
