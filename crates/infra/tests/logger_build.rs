//! Logger construction tests for the composition root.

use rotolog_config::{ConfigFormat, LoggerEnv, load_logger_config_from_sources};
use rotolog_infra::{InfraResult, build_logger, default_factories};
use rotolog_shared::ErrorCode;
use std::path::Path;

fn file_config(dir: &Path, rolling: &str) -> String {
    format!(
        r#"{{
          "version": 1,
          "timeFormat": "dashSecond",
          "async": {{ "capacity": 16 }},
          "adapters": [
            {{
              "kind": "file",
              "level": "info",
              "options": {{
                "path": {path},
                "filename": "app.log",
                {rolling}
              }}
            }}
          ]
        }}"#,
        path = serde_json::Value::from(dir.to_string_lossy().as_ref()),
    )
}

#[test]
fn config_driven_logger_writes_through_async_file_adapter() -> InfraResult<()> {
    let dir = tempfile::tempdir().map_err(rotolog_shared::ErrorEnvelope::from)?;
    let text = file_config(dir.path(), r#""rolling": "line", "maxLine": 1000"#);
    let config =
        load_logger_config_from_sources(Some((&text, ConfigFormat::Json)), &LoggerEnv::default())?;

    let logger = build_logger(&config)?;
    assert_eq!(logger.async_options().map(|options| options.capacity), Some(16));

    logger.debug("filtered")?;
    for index in 0..10 {
        logger.info(format!("line-{index}"))?;
    }
    logger.flush()?;

    let written = std::fs::read_to_string(dir.path().join("app.log"))
        .map_err(rotolog_shared::ErrorEnvelope::from)?;
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 10);
    assert!(lines.iter().all(|line| line.contains("[ INFO]")));
    assert!(lines.last().is_some_and(|line| line.ends_with("line-9")));
    Ok(())
}

#[test]
fn missing_rotation_parameter_fails_at_build() -> InfraResult<()> {
    let dir = tempfile::tempdir().map_err(rotolog_shared::ErrorEnvelope::from)?;
    let text = file_config(dir.path(), r#""rolling": "size""#);
    let config =
        load_logger_config_from_sources(Some((&text, ConfigFormat::Json)), &LoggerEnv::default())?;

    let error = build_logger(&config).err();
    assert_eq!(
        error.map(|envelope| envelope.code),
        Some(ErrorCode::new("config", "missing_rotation_parameter"))
    );
    Ok(())
}

#[test]
fn unknown_kind_fails_at_build() -> InfraResult<()> {
    let text = r#"{ "adapters": [ { "id": "remote", "kind": "syslog" } ] }"#;
    let config =
        load_logger_config_from_sources(Some((text, ConfigFormat::Json)), &LoggerEnv::default())?;

    assert!(!default_factories().contains("syslog"));
    let error = build_logger(&config).err();
    assert_eq!(
        error.map(|envelope| envelope.code),
        Some(ErrorCode::unknown_adapter_kind())
    );
    Ok(())
}
