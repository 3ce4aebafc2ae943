//! Filesystem helpers for the file adapter.

use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Returns true when `path` exists.
#[must_use]
pub fn exists(path: &Path) -> bool {
    path.try_exists().unwrap_or(false)
}

/// Open `path` for appending, creating it when absent.
pub fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Create `dir` and its parents when missing.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(dir)
}

/// Number of newline-terminated lines in `path`.
pub fn count_lines(path: &Path) -> io::Result<u64> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut lines = 0_u64;
    loop {
        let buffer = reader.fill_buf()?;
        if buffer.is_empty() {
            return Ok(lines);
        }
        let newlines = buffer.iter().filter(|byte| **byte == b'\n').count();
        lines = lines.saturating_add(u64::try_from(newlines).unwrap_or(u64::MAX));
        let consumed = buffer.len();
        reader.consume(consumed);
    }
}

/// Size and last-modified time of an open file.
pub fn stat(file: &File) -> io::Result<(u64, Option<DateTime<Local>>)> {
    let metadata = file.metadata()?;
    let modified = metadata.modified().ok().map(DateTime::<Local>::from);
    Ok((metadata.len(), modified))
}
