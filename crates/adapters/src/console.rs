//! Console adapter writing formatted events to a line sink.

use crate::formatter;
use crate::log_sink::StdoutLogSink;
use rotolog_domain::AtomicLevel;
use rotolog_ports::{AdapterId, FormatMode, Level, LogAdapter, LogEvent, LogSink};
use rotolog_shared::{ErrorEnvelope, Result};
use std::sync::Arc;

/// Kind name of the console adapter.
pub const CONSOLE_KIND: &str = "console";

/// Adapter that writes one line per event to stdout (or any [`LogSink`]).
pub struct ConsoleAdapter {
    id: AdapterId,
    level: AtomicLevel,
    format: FormatMode,
    color: bool,
    sink: Arc<dyn LogSink>,
}

impl ConsoleAdapter {
    /// Create a console adapter writing to stdout.
    #[must_use]
    pub fn new(id: AdapterId, level: Level, format: FormatMode, color: bool) -> Self {
        Self::with_sink(id, level, format, color, Arc::new(StdoutLogSink))
    }

    /// Create a console adapter writing to `sink`.
    #[must_use]
    pub fn with_sink(
        id: AdapterId,
        level: Level,
        format: FormatMode,
        color: bool,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            id,
            level: AtomicLevel::new(level),
            format,
            color,
            sink,
        }
    }

    /// Returns true when output is wrapped in ANSI colors.
    #[must_use]
    pub const fn color(&self) -> bool {
        self.color
    }
}

impl std::fmt::Debug for ConsoleAdapter {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ConsoleAdapter")
            .field("id", &self.id)
            .field("level", &self.level.load())
            .field("format", &self.format)
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

impl LogAdapter for ConsoleAdapter {
    fn id(&self) -> &AdapterId {
        &self.id
    }

    fn kind(&self) -> &str {
        CONSOLE_KIND
    }

    fn init(&self) -> Result<()> {
        tracing::debug!(adapter = %self.id, "console adapter ready");
        Ok(())
    }

    fn level(&self) -> Level {
        self.level.load()
    }

    fn set_level(&self, level: Level) {
        self.level.store(level);
    }

    fn format(&self) -> FormatMode {
        self.format
    }

    fn append(&self, event: &LogEvent) -> Result<()> {
        let text = formatter::encode(self.format, event);
        let mut line = if self.color {
            formatter::colorize(event.level(), &text)
        } else {
            text
        };
        line.push('\n');

        self.sink
            .write_line(&line)
            .map_err(|error| ErrorEnvelope::from(error).with_metadata("adapter", self.id.as_str()))
    }

    fn flush(&self) -> Result<()> {
        self.sink
            .flush()
            .map_err(|error| ErrorEnvelope::from(error).with_metadata("adapter", self.id.as_str()))
    }
}
