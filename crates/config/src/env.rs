//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict: a variable that is present but empty or malformed
//! fails the load instead of being ignored.

use crate::schema::{AsyncConfig, LoggerConfig, ValidatedLoggerConfig};
use rotolog_domain::Level;
use rotolog_shared::{ErrorCode, ErrorEnvelope};
use std::collections::BTreeMap;
use std::fmt;

/// Env var: threshold applied to every configured adapter.
pub const ENV_LEVEL: &str = "ROTOLOG_LEVEL";
/// Env var: switch to async dispatch with this queue capacity.
pub const ENV_ASYNC_CAPACITY: &str = "ROTOLOG_ASYNC_CAPACITY";
/// Env var: enable or disable caller capture.
pub const ENV_CALLER: &str = "ROTOLOG_CALLER";

/// Typed env-derived overrides for `LoggerConfig`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggerEnv {
    /// Override for every `adapters[].level`.
    pub level: Option<Level>,
    /// Override for `async.capacity`; enables async dispatch.
    pub async_capacity: Option<usize>,
    /// Override for `caller`.
    pub caller: Option<bool>,
}

impl LoggerEnv {
    /// Parse overrides from a variable map.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            level: parse_optional_level(map, ENV_LEVEL)?,
            async_capacity: parse_optional_usize(map, ENV_ASYNC_CAPACITY)?,
            caller: parse_optional_bool(map, ENV_CALLER)?,
        })
    }

    /// Returns true when no override is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.level.is_none() && self.async_capacity.is_none() && self.caller.is_none()
    }
}

/// Apply env overrides to a base config (env wins over file/default values).
pub fn apply_env_overrides(
    base: LoggerConfig,
    env: &LoggerEnv,
) -> Result<ValidatedLoggerConfig, ErrorEnvelope> {
    let mut config = base;

    if let Some(level) = env.level {
        let name: Box<str> = level.as_str().to_ascii_lowercase().into();
        for adapter in &mut config.adapters {
            adapter.level.clone_from(&name);
        }
    }
    if let Some(capacity) = env.async_capacity {
        let mut dispatch = config.async_dispatch.unwrap_or_default();
        dispatch.capacity = capacity;
        config.async_dispatch = Some(dispatch);
    }
    if let Some(caller) = env.caller {
        config.caller = caller;
    }
    if !env.is_empty() {
        tracing::debug!(?env, "applied env overrides");
    }

    config.validate_and_normalize().map_err(Into::into)
}

/// Validation failures when parsing env variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Boolean env var had an invalid value.
    InvalidBool {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Integer env var had an invalid value.
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Level env var had an unknown name.
    InvalidLevel {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_var"),
            Self::InvalidBool { .. } => ErrorCode::new("config", "invalid_env_bool"),
            Self::InvalidInt { .. } => ErrorCode::new("config", "invalid_env_int"),
            Self::InvalidLevel { .. } => ErrorCode::new("config", "invalid_env_level"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
            Self::InvalidBool { var, .. } => write!(formatter, "{var} must be a boolean"),
            Self::InvalidInt { var, .. } => {
                write!(formatter, "{var} must be a non-negative integer")
            },
            Self::InvalidLevel { var, .. } => write!(
                formatter,
                "{var} must be one of debug, info, warn, error, fatal, off"
            ),
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidBool { var, value }
            | EnvParseError::InvalidInt { var, value }
            | EnvParseError::InvalidLevel { var, value } => envelope
                .with_metadata("env_var", var)
                .with_metadata("value", value),
        }
    }
}

fn present<'a>(
    map: &'a BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<&'a str>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }
    Ok(Some(trimmed))
}

fn parse_optional_level(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Level>, EnvParseError> {
    let Some(value) = present(map, var)? else {
        return Ok(None);
    };
    Level::parse(value)
        .map(Some)
        .map_err(|_| EnvParseError::InvalidLevel {
            var,
            value: value.to_owned(),
        })
}

fn parse_optional_usize(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<usize>, EnvParseError> {
    let Some(value) = present(map, var)? else {
        return Ok(None);
    };
    value
        .parse::<usize>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: value.to_owned(),
        })
}

fn parse_optional_bool(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<bool>, EnvParseError> {
    let Some(value) = present(map, var)? else {
        return Ok(None);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        _ => Err(EnvParseError::InvalidBool {
            var,
            value: value.to_owned(),
        }),
    }
}
