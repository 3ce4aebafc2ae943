//! Logger construction from validated config.

use crate::InfraResult;
use rotolog_adapters::{ConsoleFactory, FileFactory};
use rotolog_app::{AdapterFactories, Logger, LoggerOptions, StderrFaultSink};
use rotolog_config::ValidatedLoggerConfig;
use rotolog_domain::{AdapterId, FormatMode, Level};
use rotolog_ports::{AdapterSpec, LogSink};
use std::sync::Arc;

/// Factory set with the built-in `console` and `file` kinds.
#[must_use]
pub fn default_factories() -> AdapterFactories {
    AdapterFactories::new()
        .with(Arc::new(ConsoleFactory::new()))
        .with(Arc::new(FileFactory::new()))
}

/// Build a logger from validated config with the default factories, reporting
/// adapter faults on stderr.
pub fn build_logger(config: &ValidatedLoggerConfig) -> InfraResult<Logger> {
    build_logger_with(default_factories(), config, Arc::new(StderrFaultSink))
}

/// Build a logger from validated config.
///
/// Adapters are attached in config order; the first failure aborts the build.
/// Async dispatch is enabled last so attachment never races with delivery.
pub fn build_logger_with(
    factories: AdapterFactories,
    config: &ValidatedLoggerConfig,
    fault_sink: Arc<dyn LogSink>,
) -> InfraResult<Logger> {
    let options = LoggerOptions {
        caller: config.caller,
        fault_sink,
        ..LoggerOptions::default()
    };
    let logger = Logger::with_options(factories, options);
    logger.set_time_format(config.time_format.clone())?;

    for spec in config.adapter_specs() {
        logger.attach_spec(spec)?;
    }
    if let Some(async_options) = config.async_options() {
        logger.set_async(async_options)?;
    }

    tracing::debug!(
        adapters = config.adapter_specs().len(),
        asynchronous = config.async_options().is_some(),
        "logger built from config"
    );
    Ok(logger)
}

/// Ready-to-use logger: one colored plain-text console adapter
/// (`defaultConsole`) at INFO, caller capture on, synchronous dispatch.
pub fn default_logger() -> InfraResult<Logger> {
    let logger = Logger::new(default_factories());
    let id = AdapterId::parse(AdapterId::DEFAULT_CONSOLE)?;
    let spec = AdapterSpec::new(id, "console", Level::Info, FormatMode::Plain)
        .with_option("color", true);
    logger.attach_spec(&spec)?;
    Ok(logger)
}
