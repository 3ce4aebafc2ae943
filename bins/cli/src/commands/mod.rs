//! CLI command handlers.

pub mod config;
pub mod emit;
pub mod levels;
pub mod pipe;

pub use config::{run_config_check, run_config_show};
pub use emit::run_emit;
pub use levels::run_levels;
pub use pipe::run_pipe;

use crate::CommandContext;
use crate::error::CliError;
use rotolog_app::Logger;
use rotolog_domain::Level;
use rotolog_infra::{InfraResult, build_logger, default_logger, load_effective_config};

/// Build the logger described by the effective config.
///
/// A config without adapters falls back to the default console logger.
pub(crate) fn logger_from_context(context: &CommandContext) -> InfraResult<Logger> {
    let config = load_effective_config(&context.env, context.config_path.as_deref())?;
    if config.adapter_specs().is_empty() {
        tracing::debug!("no adapters configured; using default console");
        return default_logger();
    }
    build_logger(&config)
}

pub(crate) fn parse_level(raw: &str) -> Result<Level, CliError> {
    Level::parse(raw).map_err(|error| CliError::InvalidInput(error.to_string()))
}
