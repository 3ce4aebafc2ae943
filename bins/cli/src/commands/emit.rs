//! Emit command handler.

use super::{logger_from_context, parse_level};
use crate::error::CliError;
use crate::{CliOutput, CommandContext, format_error_output, log_info};

/// Log one event and flush every adapter.
pub fn run_emit(context: &CommandContext, level: &str, body: &str) -> Result<CliOutput, CliError> {
    let level = parse_level(level)?;
    let logger = match logger_from_context(context) {
        Ok(logger) => logger,
        Err(error) => return Ok(format_error_output(context.mode, &error)),
    };

    let outcome = logger.log(level, body).and_then(|()| logger.flush());
    if let Err(error) = outcome {
        return Ok(format_error_output(context.mode, &error));
    }

    let mut stderr = String::new();
    log_info(&mut stderr, "emitted 1 event", context.mode.no_progress);
    Ok(CliOutput::ok(String::new(), stderr))
}
