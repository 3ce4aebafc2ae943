//! Integration tests for parsing config fixtures.

use rotolog_config::{
    CURRENT_CONFIG_VERSION, ConfigFormat, LoggerEnv, load_logger_config_from_path,
    parse_logger_config_json, parse_logger_config_toml,
};
use rotolog_domain::{AsyncOptions, FormatMode, Level, TimeFormat};
use rotolog_shared::ErrorCode;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

fn fixture_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

fn read_fixture(relative: &str) -> Result<String, Box<dyn Error>> {
    Ok(fs::read_to_string(fixture_path(relative))?)
}

#[test]
fn parses_valid_toml_fixture() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("rotolog.valid.toml")?;
    let config = parse_logger_config_toml(&contents)?;

    assert_eq!(config.version, CURRENT_CONFIG_VERSION);
    assert_eq!(config.time_format, TimeFormat::DashSecond);
    assert_eq!(config.async_options(), Some(AsyncOptions::rejecting(256)));

    let specs = config.adapter_specs();
    assert_eq!(specs.len(), 2);
    let console = specs.first().ok_or("missing console")?;
    assert_eq!(console.id.as_str(), "console");
    assert_eq!(console.level, Level::Info);
    assert_eq!(console.option_bool("color"), Some(true));

    let file = specs.get(1).ok_or("missing file")?;
    assert_eq!(file.kind.as_ref(), "file");
    assert_eq!(file.format, FormatMode::Json);
    assert_eq!(file.option_u64("maxLine"), Some(10_000));
    Ok(())
}

#[test]
fn parses_valid_json_fixture_with_defaults() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("rotolog.valid.json")?;
    let config = parse_logger_config_json(&contents)?;

    assert_eq!(config.time_format, TimeFormat::Custom("%H:%M:%S".into()));
    assert!(config.caller);
    assert!(config.async_options().is_none());

    let ids: Vec<&str> = config
        .adapter_specs()
        .iter()
        .map(|spec| spec.id.as_str())
        .collect();
    assert_eq!(ids, vec!["defaultConsole", "defaultFile"]);

    let levels: Vec<Level> = config
        .adapter_specs()
        .iter()
        .map(|spec| spec.level)
        .collect();
    assert_eq!(levels, vec![Level::Warn, Level::Debug]);
    Ok(())
}

#[test]
fn duplicate_ids_fixture_is_rejected() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("rotolog.duplicate-id.json")?;
    let error = parse_logger_config_json(&contents)
        .err()
        .ok_or("expected duplicate id error")?;

    assert_eq!(error.code, ErrorCode::duplicate_adapter());
    assert_eq!(
        error.metadata.get("adapter").map(String::as_str),
        Some("main")
    );
    Ok(())
}

#[test]
fn loading_from_path_detects_toml() -> Result<(), Box<dyn Error>> {
    let path = fixture_path("rotolog.valid.toml");
    assert_eq!(ConfigFormat::from_path(&path)?, ConfigFormat::Toml);

    let config = load_logger_config_from_path(Some(&path), &LoggerEnv::default())?;
    assert_eq!(config.adapter_specs().len(), 2);
    Ok(())
}
