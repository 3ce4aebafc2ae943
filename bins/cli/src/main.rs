//! CLI binary entrypoint.

mod commands;
mod error;
mod format;

use clap::{Parser, Subcommand, ValueEnum};
use commands::{run_config_check, run_config_show, run_emit, run_levels, run_pipe};
use error::{CliError, ExitCode};
use format::{OutputArgs, OutputMode};
use rotolog_infra::InfraError;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Env var holding the filter for the logger's own diagnostics.
const DIAG_ENV: &str = "ROTOLOG_DIAG";
const DEFAULT_DIAG_FILTER: &str = "warn";
const ENV_PREFIX: &str = "ROTOLOG_";

#[derive(Debug, Parser)]
#[command(
    name = "rotolog",
    version,
    about = "Structured logging with rotating file output",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    /// Optional config file path (JSON/TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log one event through the configured adapters.
    Emit {
        /// Severity of the event.
        #[arg(long, default_value = "info")]
        level: String,
        /// Event body; words are joined with single spaces.
        #[arg(required = true, value_name = "MESSAGE")]
        message: Vec<String>,
    },
    /// Log every non-empty stdin line as an event.
    Pipe {
        /// Severity of every piped event.
        #[arg(long, default_value = "info")]
        level: String,
    },
    /// Show the threshold of every configured adapter.
    Levels,
    /// Config-related commands.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Validate config loading, env overrides, and normalization.
    Check,
    /// Show the effective config after env overrides.
    Show {
        /// Encoding of the rendered config.
        #[arg(long, value_enum, default_value_t = ConfigEncoding::Json)]
        format: ConfigEncoding,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ConfigEncoding {
    Json,
    Toml,
}

pub(crate) struct CliOutput {
    pub(crate) stdout: String,
    pub(crate) stderr: String,
    pub(crate) exit_code: ExitCode,
}

impl CliOutput {
    pub(crate) const fn ok(stdout: String, stderr: String) -> Self {
        Self {
            stdout,
            stderr,
            exit_code: ExitCode::Ok,
        }
    }
}

/// Shared inputs for every command.
pub(crate) struct CommandContext {
    pub(crate) mode: OutputMode,
    pub(crate) env: BTreeMap<String, String>,
    pub(crate) config_path: Option<PathBuf>,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_diagnostics(cli.output.diag_json);

    let context = CommandContext {
        mode: OutputMode::from_args(&cli.output),
        env: collect_scoped_env(ENV_PREFIX),
        config_path: cli.config.clone(),
    };

    match run(&cli.command, &context) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn init_diagnostics(json: bool) {
    let filter = EnvFilter::try_from_env(DIAG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIAG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(io::stderr))
            .try_init()
    };
    if let Err(error) = result {
        let _ = writeln!(io::stderr(), "warn: diagnostics disabled: {error}");
    }
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(command: &Commands, context: &CommandContext) -> Result<CliOutput, CliError> {
    match command {
        Commands::Emit { level, message } => run_emit(context, level, &message.join(" ")),
        Commands::Pipe { level } => run_pipe(context, level, io::stdin().lock()),
        Commands::Levels => run_levels(context),
        Commands::Config { command } => match command {
            ConfigCommands::Check => run_config_check(context),
            ConfigCommands::Show { format } => run_config_show(context, *format),
        },
    }
}

pub(crate) fn format_error_output(mode: OutputMode, error: &InfraError) -> CliOutput {
    let mut stderr = String::new();
    log_info(&mut stderr, "command failed", mode.no_progress);

    let stdout = if mode.is_json() {
        let payload = serde_json::json!({
            "status": "error",
            "error": error,
        });
        let mut output = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| {
            "{\"status\":\"error\",\"error\":{\"code\":\"core:internal\"}}".to_string()
        });
        output.push('\n');
        output
    } else {
        let mut output = format!(
            "status: error\ncode: {}\nkind: {}\nmessage: {}\n",
            error.code, error.kind, error.message
        );
        for (key, value) in &error.metadata {
            output.push_str(&format!("{key}: {value}\n"));
        }
        output
    };

    CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::for_envelope(error),
    }
}

pub(crate) fn log_info(stderr: &mut String, message: &str, no_progress: bool) {
    if no_progress {
        return;
    }
    stderr.push_str("info: ");
    stderr.push_str(message);
    stderr.push('\n');
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;
    stdout.flush()?;

    if !output.stderr.is_empty() {
        let mut stderr = io::stderr();
        stderr.write_all(output.stderr.as_bytes())?;
        stderr.flush()?;
    }

    Ok(())
}

fn collect_scoped_env(prefix: &str) -> BTreeMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(prefix) && key != DIAG_ENV)
        .collect()
}
