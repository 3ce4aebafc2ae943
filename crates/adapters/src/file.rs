//! Rotating file adapter.

use crate::clock::SystemClock;
use crate::formatter;
use crate::rotation::{RotationEngine, Segment};
use rotolog_domain::{AtomicLevel, DateGranularity, RotationPolicy, SizeUnit};
use rotolog_ports::{AdapterId, AdapterSpec, Clock, FormatMode, Level, LogAdapter, LogEvent};
use rotolog_shared::{ErrorCode, ErrorEnvelope, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Kind name of the file adapter.
pub const FILE_KIND: &str = "file";

/// Invalid file adapter options.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RotationConfigError {
    /// Directory option missing or blank.
    #[error("file adapter `path` must be non-empty")]
    EmptyPath,
    /// File name option missing or blank.
    #[error("file adapter `filename` must be non-empty")]
    EmptyFilename,
    /// Rolling type is not one of date, size, line.
    #[error("unknown rolling type `{value}` (expected date, size or line)")]
    UnknownRollingType {
        /// Rejected value.
        value: String,
    },
    /// The parameter required by the rolling type is missing or zero.
    #[error("rolling type `{rolling}` requires a non-zero `{parameter}`")]
    MissingParameter {
        /// Rolling type name.
        rolling: &'static str,
        /// Required option name.
        parameter: &'static str,
    },
    /// A rotation parameter has an unparseable value.
    #[error("invalid `{parameter}` value `{value}`")]
    InvalidParameter {
        /// Option name.
        parameter: &'static str,
        /// Rejected value.
        value: String,
    },
}

impl From<RotationConfigError> for ErrorEnvelope {
    fn from(error: RotationConfigError) -> Self {
        let code = match &error {
            RotationConfigError::EmptyPath => "empty_path",
            RotationConfigError::EmptyFilename => "empty_filename",
            RotationConfigError::UnknownRollingType { .. } => "invalid_rolling_type",
            RotationConfigError::MissingParameter { .. } => "missing_rotation_parameter",
            RotationConfigError::InvalidParameter { .. } => "invalid_rotation_parameter",
        };
        let envelope = Self::expected(ErrorCode::new("config", code), error.to_string());
        match error {
            RotationConfigError::EmptyPath | RotationConfigError::EmptyFilename => envelope,
            RotationConfigError::UnknownRollingType { value } => {
                envelope.with_metadata("value", value)
            },
            RotationConfigError::MissingParameter { rolling, parameter } => envelope
                .with_metadata("rolling", rolling)
                .with_metadata("parameter", parameter),
            RotationConfigError::InvalidParameter { parameter, value } => envelope
                .with_metadata("parameter", parameter)
                .with_metadata("value", value),
        }
    }
}

/// Validated location and rotation policy of a file adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOptions {
    directory: PathBuf,
    filename: String,
    policy: RotationPolicy,
}

impl FileOptions {
    /// Validate programmatic options.
    pub fn new(
        directory: impl Into<PathBuf>,
        filename: impl Into<String>,
        policy: RotationPolicy,
    ) -> std::result::Result<Self, RotationConfigError> {
        let directory = directory.into();
        let filename = filename.into().trim().to_owned();
        if directory.as_os_str().is_empty() || directory.to_string_lossy().trim().is_empty() {
            return Err(RotationConfigError::EmptyPath);
        }
        if filename.is_empty() {
            return Err(RotationConfigError::EmptyFilename);
        }
        match policy {
            RotationPolicy::Size { max_bytes: 0 } => {
                return Err(RotationConfigError::MissingParameter {
                    rolling: "size",
                    parameter: "maxSize",
                });
            },
            RotationPolicy::Lines { max_lines: 0 } => {
                return Err(RotationConfigError::MissingParameter {
                    rolling: "line",
                    parameter: "maxLine",
                });
            },
            _ => {},
        }
        Ok(Self {
            directory,
            filename,
            policy,
        })
    }

    /// Read options from an adapter spec.
    ///
    /// Recognised keys: `path`, `filename`, `rolling` (`date` by default),
    /// `dateSlice`, `maxSize`, `sizeUnit` (`kb` by default), `maxLine`.
    pub fn from_spec(spec: &AdapterSpec) -> std::result::Result<Self, RotationConfigError> {
        let directory = spec.option_str("path").unwrap_or_default();
        let filename = spec.option_str("filename").unwrap_or_default();
        let rolling = spec.option_str("rolling").unwrap_or("date");

        let policy = match rolling.trim().to_ascii_lowercase().as_str() {
            "date" | "daily" => {
                let slice = spec.option_str("dateSlice").unwrap_or_default();
                if slice.trim().is_empty() {
                    return Err(RotationConfigError::MissingParameter {
                        rolling: "date",
                        parameter: "dateSlice",
                    });
                }
                let granularity = DateGranularity::parse(slice).ok_or_else(|| {
                    RotationConfigError::InvalidParameter {
                        parameter: "dateSlice",
                        value: slice.to_owned(),
                    }
                })?;
                RotationPolicy::Date(granularity)
            },
            "size" => {
                let unit = match spec.option_str("sizeUnit") {
                    Some(raw) => SizeUnit::parse(raw).ok_or_else(|| {
                        RotationConfigError::InvalidParameter {
                            parameter: "sizeUnit",
                            value: raw.to_owned(),
                        }
                    })?,
                    None => SizeUnit::default(),
                };
                let amount = required_u64(spec, "size", "maxSize")?;
                RotationPolicy::Size {
                    max_bytes: unit.to_bytes(amount),
                }
            },
            "line" | "lines" => RotationPolicy::Lines {
                max_lines: required_u64(spec, "line", "maxLine")?,
            },
            other => {
                return Err(RotationConfigError::UnknownRollingType {
                    value: other.to_owned(),
                });
            },
        };

        Self::new(directory, filename, policy)
    }

    /// Directory holding the active file.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Active file name.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Full path of the active file.
    #[must_use]
    pub fn file_path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }

    /// Rotation policy.
    #[must_use]
    pub const fn policy(&self) -> RotationPolicy {
        self.policy
    }
}

fn required_u64(
    spec: &AdapterSpec,
    rolling: &'static str,
    parameter: &'static str,
) -> std::result::Result<u64, RotationConfigError> {
    match spec.options.get(parameter) {
        None => Err(RotationConfigError::MissingParameter { rolling, parameter }),
        Some(_) => match spec.option_u64(parameter) {
            Some(0) => Err(RotationConfigError::MissingParameter { rolling, parameter }),
            Some(value) => Ok(value),
            None => Err(RotationConfigError::InvalidParameter {
                parameter,
                value: spec
                    .options
                    .get(parameter)
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            }),
        },
    }
}

/// Adapter appending formatted events to a rotating local file.
///
/// One lock covers the rotation decision, the rotation itself, formatting,
/// the append and the line-count update, so concurrent writers never split a
/// line across segments.
pub struct FileAdapter {
    id: AdapterId,
    level: AtomicLevel,
    format: FormatMode,
    options: FileOptions,
    engine: RotationEngine,
    segment: Mutex<Option<Segment>>,
}

impl std::fmt::Debug for FileAdapter {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("FileAdapter")
            .field("id", &self.id)
            .field("level", &self.level.load())
            .field("format", &self.format)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl FileAdapter {
    /// Create a file adapter using the system clock.
    #[must_use]
    pub fn new(id: AdapterId, level: Level, format: FormatMode, options: FileOptions) -> Self {
        Self::with_clock(id, level, format, options, Arc::new(SystemClock))
    }

    /// Create a file adapter with an explicit clock.
    #[must_use]
    pub fn with_clock(
        id: AdapterId,
        level: Level,
        format: FormatMode,
        options: FileOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let engine = RotationEngine::new(options.file_path(), options.policy(), clock);
        Self {
            id,
            level: AtomicLevel::new(level),
            format,
            options,
            engine,
            segment: Mutex::new(None),
        }
    }

    /// Validated options.
    #[must_use]
    pub const fn options(&self) -> &FileOptions {
        &self.options
    }

    /// Lines held by the active segment (zero before the file is opened).
    #[must_use]
    pub fn segment_lines(&self) -> u64 {
        self.lock().as_ref().map_or(0, Segment::lines)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Segment>> {
        self.segment.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tag(&self, error: ErrorEnvelope) -> ErrorEnvelope {
        error.with_metadata("adapter", self.id.as_str())
    }
}

impl LogAdapter for FileAdapter {
    fn id(&self) -> &AdapterId {
        &self.id
    }

    fn kind(&self) -> &str {
        FILE_KIND
    }

    fn init(&self) -> Result<()> {
        let mut guard = self.lock();
        if guard.is_none() {
            *guard = Some(self.engine.open().map_err(|error| self.tag(error))?);
            tracing::debug!(
                adapter = %self.id,
                path = %self.engine.path().display(),
                policy = %self.options.policy,
                "file adapter ready"
            );
        }
        Ok(())
    }

    fn level(&self) -> Level {
        self.level.load()
    }

    fn set_level(&self, level: Level) {
        self.level.store(level);
    }

    fn format(&self) -> FormatMode {
        self.format
    }

    fn append(&self, event: &LogEvent) -> Result<()> {
        let mut guard = self.lock();
        let segment = match guard.as_mut() {
            Some(segment) => segment,
            None => guard.insert(self.engine.open().map_err(|error| self.tag(error))?),
        };

        self.engine
            .prepare(segment)
            .map_err(|error| self.tag(error))?;

        let line = formatter::encode_line(self.format, event);
        let lines = match self.format {
            FormatMode::Json => 1,
            FormatMode::Plain => u64::try_from(line.matches('\n').count()).unwrap_or(u64::MAX),
        };
        segment
            .append(self.engine.path(), &line, lines)
            .map_err(|error| self.tag(error))
    }

    fn flush(&self) -> Result<()> {
        let mut guard = self.lock();
        let Some(segment) = guard.as_mut() else {
            return Ok(());
        };
        segment
            .flush(self.engine.path())
            .map_err(|error| self.tag(error))?;

        if !crate::fs::exists(self.engine.path()) {
            tracing::debug!(
                adapter = %self.id,
                path = %self.engine.path().display(),
                "active log file moved away, reopening"
            );
            *segment = self.engine.open().map_err(|error| self.tag(error))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotolog_shared::ErrorKind;

    fn spec() -> std::result::Result<AdapterSpec, Box<dyn std::error::Error>> {
        Ok(AdapterSpec::new(
            AdapterId::parse("file")?,
            FILE_KIND,
            Level::Debug,
            FormatMode::Plain,
        )
        .with_option("path", "./logs")
        .with_option("filename", "app.log"))
    }

    #[test]
    fn options_default_to_date_rolling_requiring_slice() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let missing = FileOptions::from_spec(&spec()?);
        assert_eq!(
            missing,
            Err(RotationConfigError::MissingParameter {
                rolling: "date",
                parameter: "dateSlice",
            })
        );

        let options = FileOptions::from_spec(&spec()?.with_option("dateSlice", "hour"))?;
        assert_eq!(options.policy(), RotationPolicy::Date(DateGranularity::Hour));
        assert_eq!(options.file_path(), Path::new("./logs").join("app.log"));
        Ok(())
    }

    #[test]
    fn size_options_convert_units() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let options = FileOptions::from_spec(
            &spec()?
                .with_option("rolling", "size")
                .with_option("maxSize", 2)
                .with_option("sizeUnit", "MB"),
        )?;
        assert_eq!(
            options.policy(),
            RotationPolicy::Size {
                max_bytes: 2 * 1024 * 1024
            }
        );

        let default_unit = FileOptions::from_spec(
            &spec()?.with_option("rolling", "size").with_option("maxSize", 3),
        )?;
        assert_eq!(default_unit.policy(), RotationPolicy::Size { max_bytes: 3072 });
        Ok(())
    }

    #[test]
    fn zero_or_missing_parameters_are_rejected() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let zero = FileOptions::from_spec(
            &spec()?.with_option("rolling", "line").with_option("maxLine", 0),
        );
        assert_eq!(
            zero,
            Err(RotationConfigError::MissingParameter {
                rolling: "line",
                parameter: "maxLine",
            })
        );

        let missing = FileOptions::from_spec(&spec()?.with_option("rolling", "size"));
        assert!(matches!(
            missing,
            Err(RotationConfigError::MissingParameter {
                parameter: "maxSize",
                ..
            })
        ));

        let garbage = FileOptions::from_spec(
            &spec()?.with_option("rolling", "line").with_option("maxLine", "many"),
        );
        assert!(matches!(
            garbage,
            Err(RotationConfigError::InvalidParameter {
                parameter: "maxLine",
                ..
            })
        ));

        let unknown = FileOptions::from_spec(&spec()?.with_option("rolling", "weekly"));
        assert!(matches!(
            unknown,
            Err(RotationConfigError::UnknownRollingType { .. })
        ));
        Ok(())
    }

    #[test]
    fn empty_location_is_a_configuration_error() {
        let policy = RotationPolicy::Lines { max_lines: 3 };
        assert_eq!(
            FileOptions::new("", "app.log", policy),
            Err(RotationConfigError::EmptyPath)
        );
        assert_eq!(
            FileOptions::new("./logs", "  ", policy),
            Err(RotationConfigError::EmptyFilename)
        );

        let envelope = ErrorEnvelope::from(RotationConfigError::EmptyFilename);
        assert_eq!(envelope.kind, ErrorKind::Expected);
        assert_eq!(envelope.code, ErrorCode::new("config", "empty_filename"));
        assert!(envelope.is_configuration());
    }

    #[test]
    fn missing_parameter_envelope_carries_metadata() {
        let envelope = ErrorEnvelope::from(RotationConfigError::MissingParameter {
            rolling: "size",
            parameter: "maxSize",
        });
        assert_eq!(
            envelope.code,
            ErrorCode::new("config", "missing_rotation_parameter")
        );
        assert_eq!(
            envelope.metadata.get("parameter").map(String::as_str),
            Some("maxSize")
        );
    }
}
