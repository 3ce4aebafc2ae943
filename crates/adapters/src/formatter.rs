//! Event encoders shared by the built-in adapters.

use rotolog_ports::{FormatMode, Level, LogEvent};
use serde::Serialize;

/// ANSI reset sequence.
pub const RESET: &str = "\x1b[0m";

#[derive(Serialize)]
struct JsonRecord<'a> {
    create_time: &'a str,
    level: u8,
    body: &'a str,
    file: &'a str,
    line: u32,
}

/// Render `<time> [<LEVEL>] [<file>:<line>] <body>` without a terminator.
#[must_use]
pub fn plain(event: &LogEvent) -> String {
    format!(
        "{} [{:>5}] [{}:{}] {}",
        event.create_time(),
        event.level(),
        event.file_name(),
        event.line(),
        event.body()
    )
}

/// Render one JSON object without a terminator.
#[must_use]
pub fn json(event: &LogEvent) -> String {
    let record = JsonRecord {
        create_time: event.create_time(),
        level: event.level().as_u8(),
        body: event.body(),
        file: event.file_name(),
        line: event.line(),
    };
    serde_json::to_string(&record).unwrap_or_else(|_| {
        format!(
            "{{\"create_time\":\"\",\"level\":{},\"body\":\"log serialization failed\",\"file\":\"null\",\"line\":0}}",
            event.level().as_u8()
        )
    })
}

/// Render an event in `mode`, without a terminator.
#[must_use]
pub fn encode(mode: FormatMode, event: &LogEvent) -> String {
    match mode {
        FormatMode::Plain => plain(event),
        FormatMode::Json => json(event),
    }
}

/// Render an event in `mode` followed by a newline.
#[must_use]
pub fn encode_line(mode: FormatMode, event: &LogEvent) -> String {
    let mut line = encode(mode, event);
    line.push('\n');
    line
}

/// Foreground color escape for a level.
#[must_use]
pub const fn level_color(level: Level) -> &'static str {
    match level {
        Level::Fatal => "\x1b[35m",
        Level::Error => "\x1b[31m",
        Level::Warn => "\x1b[33m",
        Level::Info => "\x1b[32m",
        Level::Debug | Level::Off => "\x1b[37m",
    }
}

/// Wrap `text` in the color of `level`.
#[must_use]
pub fn colorize(level: Level, text: &str) -> String {
    format!("{}{text}{RESET}", level_color(level))
}
