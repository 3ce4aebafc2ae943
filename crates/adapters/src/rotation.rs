//! File rotation engine.
//!
//! Before every append the file adapter asks the engine whether the active
//! segment must be archived. Rotation closes the handle, renames the file to
//! its archive name, opens a fresh file at the original path, and resets the
//! segment bookkeeping from that fresh file.
//!
//! Archive names:
//!
//! - date rotation: `<stem>_<bucket of the segment open time>.<ext>`
//! - size/line rotation: `<stem>.<YYYY-MM-DD-HH.MM.SS[.ffff]>.<ext>`
//!
//! When the archive name is taken, `.1`, `.2`, ... is inserted before the
//! extension.

use crate::fs;
use chrono::{DateTime, Local, Timelike};
use rotolog_domain::RotationPolicy;
use rotolog_ports::Clock;
use rotolog_shared::{ErrorCode, ErrorEnvelope, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// State of the currently open file segment.
///
/// Counters and the open time always describe the handle held here; they are
/// only reset together with the handle.
#[derive(Debug)]
pub struct Segment {
    file: Option<File>,
    opened_at: DateTime<Local>,
    bytes: u64,
    lines: u64,
}

impl Segment {
    /// Time the segment was opened.
    #[must_use]
    pub const fn opened_at(&self) -> DateTime<Local> {
        self.opened_at
    }

    /// Bytes held by the segment.
    #[must_use]
    pub const fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Lines held by the segment.
    #[must_use]
    pub const fn lines(&self) -> u64 {
        self.lines
    }

    /// Returns true while a handle is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Append `text` and account `lines` for it.
    pub fn append(&mut self, path: &Path, text: &str, lines: u64) -> Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Err(handle_lost(path, "no open handle"));
        };
        file.write_all(text.as_bytes())
            .map_err(|error| ErrorEnvelope::io(&error, "append", path))?;
        self.bytes = self
            .bytes
            .saturating_add(u64::try_from(text.len()).unwrap_or(u64::MAX));
        self.lines = self.lines.saturating_add(lines);
        Ok(())
    }

    /// Flush the open handle, if any.
    pub fn flush(&mut self, path: &Path) -> Result<()> {
        match self.file.as_mut() {
            Some(file) => file
                .flush()
                .map_err(|error| ErrorEnvelope::io(&error, "flush", path)),
            None => Ok(()),
        }
    }
}

/// Decides and performs rotation for one log file.
pub struct RotationEngine {
    path: PathBuf,
    policy: RotationPolicy,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RotationEngine {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RotationEngine")
            .field("path", &self.path)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RotationEngine {
    /// Create an engine for the file at `path`.
    pub fn new(path: impl Into<PathBuf>, policy: RotationPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            policy,
            clock,
        }
    }

    /// Active file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Configured policy.
    #[must_use]
    pub const fn policy(&self) -> RotationPolicy {
        self.policy
    }

    /// Current time according to the engine's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    /// Open the active file for the first time.
    ///
    /// An existing non-empty file keeps its content; its modification time is
    /// taken as the segment open time so that a restart after a date boundary
    /// still archives the old bucket.
    pub fn open(&self) -> Result<Segment> {
        if let Some(parent) = self.path.parent() {
            fs::ensure_dir(parent).map_err(|error| ErrorEnvelope::io(&error, "create_dir", parent))?;
        }
        let file = self.open_file()?;
        let (bytes, modified) =
            fs::stat(&file).map_err(|error| ErrorEnvelope::io(&error, "stat", &self.path))?;
        let lines = self.count_lines()?;
        let opened_at = match modified {
            Some(modified) if bytes > 0 => modified,
            _ => self.clock.now(),
        };
        Ok(Segment {
            file: Some(file),
            opened_at,
            bytes,
            lines,
        })
    }

    /// Returns true when the segment must be archived before writing at `now`.
    #[must_use]
    pub fn is_due(&self, segment: &Segment, now: DateTime<Local>) -> bool {
        match self.policy {
            RotationPolicy::Date(granularity) => {
                let pattern = granularity.bucket_pattern();
                segment.opened_at.format(pattern).to_string() != now.format(pattern).to_string()
            },
            RotationPolicy::Size { max_bytes } => segment.bytes >= max_bytes,
            RotationPolicy::Lines { max_lines } => segment.lines >= max_lines,
        }
    }

    /// Make the segment ready for the next append: reopen a lost handle and
    /// rotate when the policy says so. Returns the archive path when a
    /// rotation happened.
    pub fn prepare(&self, segment: &mut Segment) -> Result<Option<PathBuf>> {
        if !segment.is_open() {
            self.reset(segment)?;
        }
        let now = self.clock.now();
        if !self.is_due(segment, now) {
            return Ok(None);
        }
        self.rotate(segment, now).map(Some)
    }

    /// Archive the active file and start a fresh segment.
    pub fn rotate(&self, segment: &mut Segment, now: DateTime<Local>) -> Result<PathBuf> {
        segment.flush(&self.path)?;
        drop(segment.file.take());

        let archive = self.archive_path(segment.opened_at, now);
        if fs::exists(&self.path) {
            if let Err(error) = std::fs::rename(&self.path, &archive) {
                let rename_error = ErrorEnvelope::io(&error, "rename", &self.path)
                    .with_metadata("archive", archive.to_string_lossy().to_string());
                return match self.reopen(segment) {
                    Ok(()) => Err(rename_error),
                    Err(reopen_error) => Err(reopen_error),
                };
            }
        }

        self.reset(segment)?;
        tracing::debug!(
            path = %self.path.display(),
            archive = %archive.display(),
            policy = %self.policy,
            "log file rotated"
        );
        Ok(archive)
    }

    /// Archive path for a segment opened at `opened_at` and rotated at `now`.
    #[must_use]
    pub fn archive_path(&self, opened_at: DateTime<Local>, now: DateTime<Local>) -> PathBuf {
        let tag = match self.policy {
            RotationPolicy::Date(granularity) => {
                format!("_{}", opened_at.format(granularity.bucket_pattern()))
            },
            RotationPolicy::Size { .. } | RotationPolicy::Lines { .. } => {
                format!(".{}", archive_timestamp(now))
            },
        };
        let (stem, extension) = split_file_name(&self.path);
        let directory = self.path.parent().unwrap_or_else(|| Path::new(""));

        let mut candidate = directory.join(format!("{stem}{tag}{extension}"));
        let mut suffix = 1_u32;
        while fs::exists(&candidate) {
            candidate = directory.join(format!("{stem}{tag}.{suffix}{extension}"));
            suffix = suffix.saturating_add(1);
        }
        candidate
    }

    /// Open a fresh segment at the active path; the open time becomes now and
    /// counters are read from the file.
    fn reset(&self, segment: &mut Segment) -> Result<()> {
        let file = match self.open_file() {
            Ok(file) => file,
            Err(error) => {
                segment.file = None;
                return Err(handle_lost(&self.path, &error.message));
            },
        };
        let (bytes, _) =
            fs::stat(&file).map_err(|error| ErrorEnvelope::io(&error, "stat", &self.path))?;
        segment.lines = self.count_lines()?;
        segment.bytes = bytes;
        segment.opened_at = self.clock.now();
        segment.file = Some(file);
        Ok(())
    }

    /// Reopen the active path after a failed rename, keeping the open time.
    fn reopen(&self, segment: &mut Segment) -> Result<()> {
        match self.open_file() {
            Ok(file) => {
                segment.file = Some(file);
                Ok(())
            },
            Err(error) => Err(handle_lost(&self.path, &error.message)),
        }
    }

    fn open_file(&self) -> Result<File> {
        fs::open_append(&self.path).map_err(|error| ErrorEnvelope::io(&error, "open", &self.path))
    }

    fn count_lines(&self) -> Result<u64> {
        fs::count_lines(&self.path)
            .map_err(|error| ErrorEnvelope::io(&error, "count_lines", &self.path))
    }
}

/// `YYYY-MM-DD-HH.MM.SS` followed by up to four fractional-second digits with
/// trailing zeros removed (no dot at all when the fraction is zero).
#[must_use]
pub fn archive_timestamp(now: DateTime<Local>) -> String {
    let mut stamp = now.format("%Y-%m-%d-%H.%M.%S").to_string();
    let fraction = now.nanosecond().min(999_999_999) / 100_000;
    if fraction > 0 {
        let digits = format!("{fraction:04}");
        stamp.push('.');
        stamp.push_str(digits.trim_end_matches('0'));
    }
    stamp
}

/// Split a file name into its stem and extension (with the leading dot).
fn split_file_name(path: &Path) -> (String, String) {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    match name.rfind('.') {
        Some(index) if index > 0 => {
            let (stem, extension) = name.split_at(index);
            (stem.to_owned(), extension.to_owned())
        },
        _ => (name, String::new()),
    }
}

fn handle_lost(path: &Path, cause: &str) -> ErrorEnvelope {
    ErrorEnvelope::invariant(
        ErrorCode::new("file", "handle_lost"),
        format!("log file could not be reopened: {cause}"),
    )
    .with_metadata("path", path.to_string_lossy().to_string())
}
