//! Config loading helpers (env + file).
//!
//! The loader is responsible for deterministic merge order and surfacing
//! user-facing errors as typed `ErrorEnvelope`s.

use crate::{LoggerConfig, LoggerEnv, ValidatedLoggerConfig, apply_env_overrides};
use rotolog_shared::{ErrorClass, ErrorCode, ErrorEnvelope, ResultExt};
use std::path::Path;

/// Serialization format of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.json` (also used when the path has no extension).
    Json,
    /// `.toml`.
    Toml,
}

impl ConfigFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ErrorEnvelope> {
        let ext = path
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            None | Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            Some(other) => Err(ErrorEnvelope::expected(
                ErrorCode::new("config", "unsupported_format"),
                "unsupported config format; use .json or .toml",
            )
            .with_metadata("extension", other.to_string())),
        }
    }
}

/// Load the logger config from text using a deterministic precedence order.
///
/// Precedence (highest wins):
/// - env overrides (`LoggerEnv`)
/// - config text
/// - defaults (`LoggerConfig::default()`)
pub fn load_logger_config_from_sources(
    config_text: Option<(&str, ConfigFormat)>,
    env: &LoggerEnv,
) -> Result<ValidatedLoggerConfig, ErrorEnvelope> {
    let config = match config_text {
        None => LoggerConfig::default(),
        Some((input, format)) => parse_config_unvalidated(input, format)?,
    };

    // env is applied last and also validates/normalizes the resulting config.
    apply_env_overrides(config, env)
}

/// Load the logger config from an optional file path.
pub fn load_logger_config_from_path(
    config_path: Option<&Path>,
    env: &LoggerEnv,
) -> Result<ValidatedLoggerConfig, ErrorEnvelope> {
    let config = match config_path {
        None => LoggerConfig::default(),
        Some(path) => {
            let format = ConfigFormat::from_path(path)?;
            let config_text = read_config_file(path)?;
            parse_config_unvalidated(&config_text, format)
                .with_metadata("path", path.to_string_lossy())?
        },
    };

    apply_env_overrides(config, env)
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &LoggerConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize the config as deterministic pretty TOML (with trailing newline).
pub fn to_pretty_toml(config: &LoggerConfig) -> Result<String, ErrorEnvelope> {
    let mut output = toml::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_toml"),
            format!("failed to serialize config TOML: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    if !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

fn parse_config_unvalidated(
    input: &str,
    format: ConfigFormat,
) -> Result<LoggerConfig, ErrorEnvelope> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid config JSON: {error}"),
            )
            .with_metadata("source", "config")
        }),
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_toml"),
                format!("invalid config TOML: {error}"),
            )
            .with_metadata("source", "config")
        }),
    }
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "config_file_permission_denied")
            },
            _ => ErrorCode::new("config", "config_file_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
            .with_metadata("path", path.to_string_lossy().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotolog_domain::Level;
    use std::error::Error;

    const CONFIG_JSON: &str = r#"{
      "version": 1,
      "caller": false,
      "adapters": [
        { "kind": "console", "level": "info", "options": { "color": true } }
      ]
    }"#;

    #[test]
    fn env_wins_over_config_text() -> Result<(), Box<dyn Error>> {
        let env = LoggerEnv {
            caller: Some(true),
            level: Some(Level::Warn),
            ..LoggerEnv::default()
        };

        let config =
            load_logger_config_from_sources(Some((CONFIG_JSON, ConfigFormat::Json)), &env)?;
        assert!(config.caller);
        let spec = config.adapter_specs().first().ok_or("missing adapter")?;
        assert_eq!(spec.level, Level::Warn);
        assert_eq!(spec.option_bool("color"), Some(true));
        Ok(())
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<(), Box<dyn Error>> {
        let config = load_logger_config_from_sources(None, &LoggerEnv::default())?;
        assert_eq!(config.version, 1);
        assert!(config.adapter_specs().is_empty());
        Ok(())
    }

    #[test]
    fn serialization_is_deterministic() -> Result<(), Box<dyn Error>> {
        let config = load_logger_config_from_sources(
            Some((CONFIG_JSON, ConfigFormat::Json)),
            &LoggerEnv::default(),
        )?;
        let first = to_pretty_json(&config)?;
        let second = to_pretty_json(&config)?;
        assert_eq!(first, second);
        assert!(first.ends_with('\n'));
        assert!(first.contains("\"id\": \"defaultConsole\""));
        Ok(())
    }

    #[test]
    fn toml_output_parses_back_to_the_same_config() -> Result<(), Box<dyn Error>> {
        let config = load_logger_config_from_sources(
            Some((CONFIG_JSON, ConfigFormat::Json)),
            &LoggerEnv::default(),
        )?;
        let rendered = to_pretty_toml(&config)?;
        let reparsed = load_logger_config_from_sources(
            Some((&rendered, ConfigFormat::Toml)),
            &LoggerEnv::default(),
        )?;
        assert_eq!(reparsed.as_ref(), config.as_ref());
        Ok(())
    }

    #[test]
    fn malformed_json_reports_source() {
        let error = load_logger_config_from_sources(
            Some((r#"{ "version": }"#, ConfigFormat::Json)),
            &LoggerEnv::default(),
        )
        .err();
        let error = error.map(|envelope| {
            (
                envelope.code,
                envelope.metadata.get("source").cloned().unwrap_or_default(),
            )
        });
        assert_eq!(
            error,
            Some((ErrorCode::new("config", "invalid_json"), "config".to_owned()))
        );
    }

    #[test]
    fn format_is_detected_from_extension() -> Result<(), Box<dyn Error>> {
        assert_eq!(
            ConfigFormat::from_path(Path::new("rotolog.toml"))?,
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("rotolog.JSON"))?,
            ConfigFormat::Json
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("rotolog"))?,
            ConfigFormat::Json
        );
        let error = ConfigFormat::from_path(Path::new("rotolog.yaml")).err();
        assert_eq!(
            error.map(|envelope| envelope.code),
            Some(ErrorCode::new("config", "unsupported_format"))
        );
        Ok(())
    }

    #[test]
    fn missing_file_is_a_config_error() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("absent.toml");
        let error = load_logger_config_from_path(Some(&path), &LoggerEnv::default())
            .err()
            .ok_or("expected missing file error")?;
        assert_eq!(
            error.code,
            ErrorCode::new("config", "config_file_not_found")
        );
        assert!(error.is_configuration());
        Ok(())
    }
}
