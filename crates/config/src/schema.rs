//! Logger configuration schema, defaults, validation, and normalization.
//!
//! - Deserialization uses `serde` (JSON or TOML).
//! - Validation is manual and returns typed errors mapped to `ErrorEnvelope`.
//! - Normalization trims identifiers, lower-cases kinds and level names, and
//!   fills in default adapter ids.
//!
//! Kind-specific adapter options are not checked here; the factory for that
//! kind validates them when the adapter is built.

use rotolog_domain::{
    AdapterId, AdapterOptions, AdapterSpec, AsyncOptions, FormatMode, Level, OverflowPolicy,
    TimeFormat,
};
use rotolog_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Current supported configuration schema version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

const DEFAULT_ADAPTER_LEVEL: &str = "debug";

/// Top-level logger configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LoggerConfig {
    /// Schema version for forward-compatible migrations.
    pub version: u32,
    /// Timestamp rendering for every event.
    pub time_format: TimeFormat,
    /// Capture the caller's file and line.
    pub caller: bool,
    /// Asynchronous dispatch; absent means synchronous.
    #[serde(rename = "async", skip_serializing_if = "Option::is_none")]
    pub async_dispatch: Option<AsyncConfig>,
    /// Adapters to attach, in attachment order.
    pub adapters: Vec<AdapterConfig>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            time_format: TimeFormat::default(),
            caller: true,
            async_dispatch: None,
            adapters: Vec::new(),
        }
    }
}

/// Asynchronous dispatch settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct AsyncConfig {
    /// Queue capacity.
    pub capacity: usize,
    /// Behavior when the queue is full.
    pub on_full: OverflowPolicy,
}

impl Default for AsyncConfig {
    fn default() -> Self {
        let options = AsyncOptions::default();
        Self {
            capacity: options.capacity,
            on_full: options.on_full,
        }
    }
}

/// One adapter entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdapterConfig {
    /// Registry identifier; defaults per kind for `console` and `file`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Box<str>>,
    /// Factory name.
    pub kind: Box<str>,
    /// Initial threshold name.
    #[serde(default = "default_adapter_level")]
    pub level: Box<str>,
    /// Output encoding.
    #[serde(default)]
    pub format: FormatMode,
    /// Kind-specific options.
    #[serde(default, skip_serializing_if = "AdapterOptions::is_empty")]
    pub options: AdapterOptions,
}

fn default_adapter_level() -> Box<str> {
    DEFAULT_ADAPTER_LEVEL.into()
}

impl AdapterConfig {
    /// Entry with the default level and format and no options.
    pub fn new(kind: impl Into<Box<str>>) -> Self {
        Self {
            id: None,
            kind: kind.into(),
            level: default_adapter_level(),
            format: FormatMode::default(),
            options: AdapterOptions::new(),
        }
    }
}

impl LoggerConfig {
    /// Validate and normalize the config.
    pub fn validate_and_normalize(mut self) -> Result<ValidatedLoggerConfig, ConfigSchemaError> {
        self.validate_version()?;

        let async_options = self.async_dispatch.map(validate_async).transpose()?;

        let mut seen = BTreeSet::new();
        let mut specs = Vec::with_capacity(self.adapters.len());
        for (index, adapter) in self.adapters.iter_mut().enumerate() {
            let spec = normalize_adapter(index, adapter)?;
            if !seen.insert(spec.id.clone()) {
                return Err(ConfigSchemaError::DuplicateAdapterId {
                    id: spec.id.as_str().to_owned(),
                });
            }
            specs.push(spec);
        }

        Ok(ValidatedLoggerConfig {
            raw: self,
            specs,
            async_options,
        })
    }

    const fn validate_version(&self) -> Result<(), ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }
        Ok(())
    }
}

const fn validate_async(config: AsyncConfig) -> Result<AsyncOptions, ConfigSchemaError> {
    let options = AsyncOptions {
        capacity: config.capacity,
        on_full: config.on_full,
    };
    if !options.has_valid_capacity() {
        return Err(ConfigSchemaError::AsyncCapacityOutOfRange {
            value: config.capacity,
            min: 1,
            max: AsyncOptions::MAX_CAPACITY,
        });
    }
    Ok(options)
}

fn normalize_adapter(
    index: usize,
    adapter: &mut AdapterConfig,
) -> Result<AdapterSpec, ConfigSchemaError> {
    let kind = adapter.kind.trim().to_ascii_lowercase();
    if kind.is_empty() {
        return Err(ConfigSchemaError::EmptyAdapterKind { index });
    }

    let id = match adapter.id.as_deref() {
        Some(raw) => {
            AdapterId::parse(raw).map_err(|_| ConfigSchemaError::InvalidAdapterId { index })?
        },
        None => default_id_for(&kind).ok_or_else(|| ConfigSchemaError::MissingAdapterId {
            index,
            kind: kind.clone(),
        })?,
    };

    let level = Level::parse(&adapter.level).map_err(|_| ConfigSchemaError::InvalidLevel {
        adapter: id.as_str().to_owned(),
        value: adapter.level.to_string(),
    })?;

    adapter.id = Some(id.as_str().into());
    adapter.kind = kind.as_str().into();
    adapter.level = level.as_str().to_ascii_lowercase().into_boxed_str();

    let mut spec = AdapterSpec::new(id, kind, level, adapter.format);
    spec.options.clone_from(&adapter.options);
    Ok(spec)
}

fn default_id_for(kind: &str) -> Option<AdapterId> {
    let id = match kind {
        "console" => AdapterId::DEFAULT_CONSOLE,
        "file" => AdapterId::DEFAULT_FILE,
        _ => return None,
    };
    AdapterId::parse(id).ok()
}

/// Validated config: the normalized raw config plus typed adapter specs.
#[derive(Debug, Clone)]
pub struct ValidatedLoggerConfig {
    raw: LoggerConfig,
    specs: Vec<AdapterSpec>,
    async_options: Option<AsyncOptions>,
}

impl ValidatedLoggerConfig {
    /// Adapter specs in attachment order.
    #[must_use]
    pub fn adapter_specs(&self) -> &[AdapterSpec] {
        &self.specs
    }

    /// Async queue settings, `None` for synchronous dispatch.
    #[must_use]
    pub const fn async_options(&self) -> Option<AsyncOptions> {
        self.async_options
    }

    /// Borrow the raw config.
    #[must_use]
    pub const fn as_ref(&self) -> &LoggerConfig {
        &self.raw
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> LoggerConfig {
        self.raw
    }
}

impl AsRef<LoggerConfig> for ValidatedLoggerConfig {
    fn as_ref(&self) -> &LoggerConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedLoggerConfig {
    type Target = LoggerConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Parse a logger config from a JSON string, applying validation and normalization.
pub fn parse_logger_config_json(input: &str) -> Result<ValidatedLoggerConfig, ErrorEnvelope> {
    let config: LoggerConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Parse a logger config from a TOML string, applying validation and normalization.
pub fn parse_logger_config_toml(input: &str) -> Result<ValidatedLoggerConfig, ErrorEnvelope> {
    let config: LoggerConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Typed validation errors for the configuration schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// The config version is not supported by this binary.
    UnsupportedVersion {
        /// Version found in the config.
        found: u32,
        /// Version supported by this crate.
        supported: u32,
    },
    /// The async queue capacity is out of bounds.
    AsyncCapacityOutOfRange {
        /// Value provided.
        value: usize,
        /// Minimum allowed value.
        min: usize,
        /// Maximum allowed value.
        max: usize,
    },
    /// An adapter entry has a blank kind.
    EmptyAdapterKind {
        /// Position in `adapters`.
        index: usize,
    },
    /// An adapter entry has a blank id.
    InvalidAdapterId {
        /// Position in `adapters`.
        index: usize,
    },
    /// An adapter entry has no id and its kind has no default id.
    MissingAdapterId {
        /// Position in `adapters`.
        index: usize,
        /// Normalized kind.
        kind: String,
    },
    /// Two adapter entries share an id.
    DuplicateAdapterId {
        /// Repeated id.
        id: String,
    },
    /// An adapter level name is not recognized.
    InvalidLevel {
        /// Adapter id.
        adapter: String,
        /// Raw level value.
        value: String,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new("config", "unsupported_version"),
            Self::AsyncCapacityOutOfRange { .. } => {
                ErrorCode::new("config", "invalid_async_capacity")
            },
            Self::EmptyAdapterKind { .. } => ErrorCode::new("config", "invalid_adapter"),
            Self::InvalidAdapterId { .. } | Self::MissingAdapterId { .. } => {
                ErrorCode::new("config", "invalid_adapter_id")
            },
            Self::DuplicateAdapterId { .. } => ErrorCode::duplicate_adapter(),
            Self::InvalidLevel { .. } => ErrorCode::new("config", "invalid_level"),
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, supported } => write!(
                formatter,
                "unsupported config version {found} (supported: {supported})"
            ),
            Self::AsyncCapacityOutOfRange { value, min, max } => write!(
                formatter,
                "async.capacity must be between {min} and {max}, got {value}"
            ),
            Self::EmptyAdapterKind { index } => {
                write!(formatter, "adapters[{index}].kind must be non-empty")
            },
            Self::InvalidAdapterId { index } => {
                write!(formatter, "adapters[{index}].id must be non-empty")
            },
            Self::MissingAdapterId { index, kind } => write!(
                formatter,
                "adapters[{index}] of kind `{kind}` needs an explicit id"
            ),
            Self::DuplicateAdapterId { id } => {
                write!(formatter, "adapter id `{id}` is declared more than once")
            },
            Self::InvalidLevel { adapter, value } => {
                write!(formatter, "adapter `{adapter}` has unknown level `{value}`")
            },
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => envelope
                .with_metadata("found", found.to_string())
                .with_metadata("supported", supported.to_string()),
            ConfigSchemaError::AsyncCapacityOutOfRange { value, min, max } => envelope
                .with_metadata("field", "async.capacity")
                .with_metadata("value", value.to_string())
                .with_metadata("min", min.to_string())
                .with_metadata("max", max.to_string()),
            ConfigSchemaError::EmptyAdapterKind { index }
            | ConfigSchemaError::InvalidAdapterId { index } => {
                envelope.with_metadata("index", index.to_string())
            },
            ConfigSchemaError::MissingAdapterId { index, kind } => envelope
                .with_metadata("index", index.to_string())
                .with_metadata("kind", kind),
            ConfigSchemaError::DuplicateAdapterId { id } => envelope.with_metadata("adapter", id),
            ConfigSchemaError::InvalidLevel { adapter, value } => envelope
                .with_metadata("adapter", adapter)
                .with_metadata("value", value),
        }
    }
}
