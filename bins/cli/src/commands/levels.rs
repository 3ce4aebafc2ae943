//! Levels command handler.

use super::logger_from_context;
use crate::error::CliError;
use crate::{CliOutput, CommandContext, format_error_output};
use rotolog_domain::{AdapterId, Level};
use std::collections::BTreeMap;

/// Show the threshold of every adapter the config attaches.
pub fn run_levels(context: &CommandContext) -> Result<CliOutput, CliError> {
    let logger = match logger_from_context(context) {
        Ok(logger) => logger,
        Err(error) => return Ok(format_error_output(context.mode, &error)),
    };
    let levels = logger.levels();

    let stdout = if context.mode.is_json() {
        format_levels_json(&levels)?
    } else {
        format_levels_text(&levels)
    };
    Ok(CliOutput::ok(stdout, String::new()))
}

fn format_levels_text(levels: &BTreeMap<AdapterId, Level>) -> String {
    let mut output = String::from("status: ok\n");
    for (id, level) in levels {
        output.push_str(id.as_str());
        output.push_str(": ");
        output.push_str(level.as_str());
        output.push('\n');
    }
    output
}

fn format_levels_json(levels: &BTreeMap<AdapterId, Level>) -> Result<String, CliError> {
    let levels: serde_json::Map<String, serde_json::Value> = levels
        .iter()
        .map(|(id, level)| (id.to_string(), serde_json::Value::from(level.as_str())))
        .collect();
    let payload = serde_json::json!({
        "status": "ok",
        "levels": levels,
    });
    let mut output = serde_json::to_string_pretty(&payload)?;
    output.push('\n');
    Ok(output)
}
