//! Config command handlers.

use crate::error::CliError;
use crate::{CliOutput, CommandContext, ConfigEncoding, format_error_output, log_info};
use rotolog_infra::{
    ConfigOutput, load_effective_config, render_effective_config, validate_env_parsing,
};

/// Validate the config file and env overrides without attaching adapters.
///
/// Env overrides are checked on their own first, so a bad variable is reported
/// even when the config file is also broken.
pub fn run_config_check(context: &CommandContext) -> Result<CliOutput, CliError> {
    if let Err(error) = validate_env_parsing(&context.env) {
        return Ok(format_error_output(context.mode, &error));
    }
    let config = match load_effective_config(&context.env, context.config_path.as_deref()) {
        Ok(config) => config,
        Err(error) => return Ok(format_error_output(context.mode, &error)),
    };

    let mut stderr = String::new();
    log_info(&mut stderr, "config check completed", context.mode.no_progress);

    let path = context
        .config_path
        .as_ref()
        .map(|path| path.to_string_lossy().to_string());
    let adapters = config.adapter_specs().len();
    let dispatch = config.async_options().map_or_else(
        || "sync".to_string(),
        |options| format!("async({}, {})", options.capacity, options.on_full),
    );

    let stdout = if context.mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "configPath": path,
            "adapters": adapters,
            "dispatch": dispatch,
        });
        let mut output = serde_json::to_string_pretty(&payload)?;
        output.push('\n');
        output
    } else {
        let mut output = format!("status: ok\nconfig: ok\nadapters: {adapters}\ndispatch: {dispatch}\n");
        if let Some(path) = path {
            output.push_str("path: ");
            output.push_str(&path);
            output.push('\n');
        }
        output
    };
    Ok(CliOutput::ok(stdout, stderr))
}

/// Render the effective config after env overrides.
pub fn run_config_show(
    context: &CommandContext,
    encoding: ConfigEncoding,
) -> Result<CliOutput, CliError> {
    let output = match encoding {
        ConfigEncoding::Json => ConfigOutput::Json,
        ConfigEncoding::Toml => ConfigOutput::Toml,
    };
    match render_effective_config(&context.env, context.config_path.as_deref(), output) {
        Ok(rendered) => Ok(CliOutput::ok(rendered, String::new())),
        Err(error) => Ok(format_error_output(context.mode, &error)),
    }
}
