//! Pipe command handler.

use super::{logger_from_context, parse_level};
use crate::error::CliError;
use crate::{CliOutput, CommandContext, format_error_output, log_info};
use std::io::BufRead;

/// Log every non-empty input line, then drain and flush.
///
/// A failed line does not stop the pipe; the first failure decides the exit code.
pub fn run_pipe(
    context: &CommandContext,
    level: &str,
    input: impl BufRead,
) -> Result<CliOutput, CliError> {
    let level = parse_level(level)?;
    let logger = match logger_from_context(context) {
        Ok(logger) => logger,
        Err(error) => return Ok(format_error_output(context.mode, &error)),
    };

    let mut emitted = 0_u64;
    let mut failed = 0_u64;
    let mut first_error = None;
    for line in input.lines() {
        let line = line?;
        let body = line.trim_end_matches('\r');
        if body.trim().is_empty() {
            continue;
        }
        match logger.log(level, body) {
            Ok(()) => emitted += 1,
            Err(error) => {
                failed += 1;
                first_error.get_or_insert(error);
            },
        }
    }
    if let Err(error) = logger.flush() {
        first_error.get_or_insert(error);
    }

    let summary = format!("piped {emitted} events ({failed} failed)");
    if let Some(error) = first_error {
        let mut output = format_error_output(context.mode, &error);
        log_info(&mut output.stderr, &summary, context.mode.no_progress);
        return Ok(output);
    }

    let mut stderr = String::new();
    log_info(&mut stderr, &summary, context.mode.no_progress);
    Ok(CliOutput::ok(String::new(), stderr))
}
