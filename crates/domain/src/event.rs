//! Log event value object.

use crate::Level;
use std::fmt;

/// Source position of the call that produced an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// File name without directories.
    pub file: Box<str>,
    /// One-based line number.
    pub line: u32,
}

impl SourceLocation {
    /// Build a location from a path as reported by the compiler, keeping only
    /// the final path component.
    #[must_use]
    pub fn from_path(path: &str, line: u32) -> Self {
        let file = path
            .rsplit(['/', '\\'])
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(path);
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.file, self.line)
    }
}

/// Immutable record produced by one log call.
///
/// Built once, then shared by reference with every adapter that accepts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    create_time: Box<str>,
    level: Level,
    body: Box<str>,
    location: Option<SourceLocation>,
}

impl LogEvent {
    /// Create an event.
    pub fn new(
        create_time: impl Into<Box<str>>,
        level: Level,
        body: impl Into<Box<str>>,
        location: Option<SourceLocation>,
    ) -> Self {
        Self {
            create_time: create_time.into(),
            level,
            body: body.into(),
            location,
        }
    }

    /// Timestamp already rendered with the logger's time format.
    #[must_use]
    pub fn create_time(&self) -> &str {
        &self.create_time
    }

    /// Severity of the event.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Free-text message.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Caller location, present only when caller capture was enabled.
    #[must_use]
    pub const fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }

    /// File name to render, `null` without a location.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.location
            .as_ref()
            .map_or("null", |location| &location.file)
    }

    /// Line to render, `0` without a location.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.location.as_ref().map_or(0, |location| location.line)
    }
}
