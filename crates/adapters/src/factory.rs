//! Built-in adapter factories.

use crate::console::{CONSOLE_KIND, ConsoleAdapter};
use crate::file::{FILE_KIND, FileAdapter, FileOptions};
use crate::log_sink::StdoutLogSink;
use rotolog_ports::{AdapterFactory, AdapterSpec, Clock, LogAdapter, LogSink};
use rotolog_shared::{ErrorEnvelope, Result};
use std::sync::Arc;

/// Builds console adapters. Option: `color` (bool, default false).
pub struct ConsoleFactory {
    sink: Arc<dyn LogSink>,
}

impl ConsoleFactory {
    /// Factory whose adapters write to stdout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(Arc::new(StdoutLogSink))
    }

    /// Factory whose adapters write to `sink`.
    #[must_use]
    pub fn with_sink(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }
}

impl Default for ConsoleFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl AdapterFactory for ConsoleFactory {
    fn kind(&self) -> &str {
        CONSOLE_KIND
    }

    fn build(&self, spec: &AdapterSpec) -> Result<Arc<dyn LogAdapter>> {
        let color = spec.option_bool("color").unwrap_or(false);
        Ok(Arc::new(ConsoleAdapter::with_sink(
            spec.id.clone(),
            spec.level,
            spec.format,
            color,
            Arc::clone(&self.sink),
        )))
    }
}

/// Builds rotating file adapters from `path`/`filename`/rolling options.
pub struct FileFactory {
    clock: Option<Arc<dyn Clock>>,
}

impl FileFactory {
    /// Factory using the system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self { clock: None }
    }

    /// Factory whose adapters read time from `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock: Some(clock) }
    }
}

impl Default for FileFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl AdapterFactory for FileFactory {
    fn kind(&self) -> &str {
        FILE_KIND
    }

    fn build(&self, spec: &AdapterSpec) -> Result<Arc<dyn LogAdapter>> {
        let options = FileOptions::from_spec(spec).map_err(|error| {
            ErrorEnvelope::from(error).with_metadata("adapter", spec.id.as_str())
        })?;
        let adapter = match &self.clock {
            Some(clock) => FileAdapter::with_clock(
                spec.id.clone(),
                spec.level,
                spec.format,
                options,
                Arc::clone(clock),
            ),
            None => FileAdapter::new(spec.id.clone(), spec.level, spec.format, options),
        };
        Ok(Arc::new(adapter))
    }
}
