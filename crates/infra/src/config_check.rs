//! Config loading helpers for CLI surfaces.

use crate::InfraResult;
use rotolog_config::{
    LoggerEnv, ValidatedLoggerConfig, load_logger_config_from_path, to_pretty_json,
    to_pretty_toml,
};
use rotolog_shared::ErrorEnvelope;
use std::collections::BTreeMap;
use std::path::Path;

/// Output encoding for the effective config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigOutput {
    /// Pretty JSON.
    #[default]
    Json,
    /// Pretty TOML.
    Toml,
}

/// Load and validate the effective config from an env map and optional file.
pub fn load_effective_config(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
) -> InfraResult<ValidatedLoggerConfig> {
    let env = LoggerEnv::from_map(env).map_err(ErrorEnvelope::from)?;
    load_logger_config_from_path(config_path, &env)
}

/// Load the effective config and render it deterministically.
pub fn render_effective_config(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
    output: ConfigOutput,
) -> InfraResult<String> {
    let config = load_effective_config(env, config_path)?;
    match output {
        ConfigOutput::Json => to_pretty_json(&config),
        ConfigOutput::Toml => to_pretty_toml(&config),
    }
}
