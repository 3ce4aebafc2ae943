//! Integration tests for the rotating file adapter.

use chrono::{DateTime, Duration, Local, TimeZone};
use rotolog_adapters::{FileAdapter, FileOptions};
use rotolog_domain::{DateGranularity, RotationPolicy};
use rotolog_ports::{AdapterId, Clock, FormatMode, Level, LogAdapter, LogEvent, SourceLocation};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug)]
struct ManualClock {
    now: Mutex<DateTime<Local>>,
}

impl ManualClock {
    fn at(year: i32, month: u32, day: u32, hour: u32) -> Result<Arc<Self>, Box<dyn std::error::Error>> {
        let now = Local
            .with_ymd_and_hms(year, month, day, hour, 0, 0)
            .earliest()
            .ok_or("invalid local time")?;
        Ok(Arc::new(Self {
            now: Mutex::new(now),
        }))
    }

    fn advance(&self, step: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += step;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.now.lock().map(|now| *now).unwrap_or_else(|_| Local::now())
    }
}

fn adapter(
    dir: &Path,
    policy: RotationPolicy,
    format: FormatMode,
    clock: &Arc<ManualClock>,
) -> Result<FileAdapter, Box<dyn std::error::Error>> {
    let options = FileOptions::new(dir, "app.log", policy)?;
    let adapter = FileAdapter::with_clock(
        AdapterId::parse("file")?,
        Level::Debug,
        format,
        options,
        Arc::clone(clock) as Arc<dyn Clock>,
    );
    adapter.init()?;
    Ok(adapter)
}

fn event(body: &str) -> LogEvent {
    LogEvent::new(
        "2024-05-06 10:00:00.000",
        Level::Info,
        body,
        Some(SourceLocation::from_path("tests/file_rotation.rs", 1)),
    )
}

fn archives(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.file_name().and_then(|name| name.to_str()) != Some("app.log") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn bodies(path: &Path) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    Ok(std::fs::read_to_string(path)?
        .lines()
        .filter_map(|line| line.rsplit(' ').next().map(str::to_owned))
        .collect())
}

#[test]
fn line_rotation_archives_full_segment_before_fourth_write() -> TestResult {
    let dir = tempfile::tempdir()?;
    let clock = ManualClock::at(2024, 5, 6, 10)?;
    let adapter = adapter(
        dir.path(),
        RotationPolicy::Lines { max_lines: 3 },
        FormatMode::Plain,
        &clock,
    )?;

    for body in ["one", "two", "three", "four"] {
        adapter.write(&event(body))?;
    }
    adapter.flush()?;

    let archives = archives(dir.path())?;
    assert_eq!(archives.len(), 1);
    let archive_name = archives
        .first()
        .and_then(|path| path.file_name())
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    assert_eq!(archive_name, "app.2024-05-06-10.00.00.log");

    let archived = bodies(archives.first().ok_or("archive missing")?)?;
    assert_eq!(archived, vec!["one", "two", "three"]);
    assert_eq!(bodies(&dir.path().join("app.log"))?, vec!["four"]);
    assert_eq!(adapter.segment_lines(), 1);
    Ok(())
}

#[test]
fn size_boundary_puts_triggering_line_in_fresh_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let clock = ManualClock::at(2024, 5, 6, 10)?;
    let sample = format!("{}\n", rotolog_adapters::formatter::plain(&event("aaaa")));
    let line_bytes = u64::try_from(sample.len())?;
    let adapter = adapter(
        dir.path(),
        RotationPolicy::Size {
            max_bytes: line_bytes * 2,
        },
        FormatMode::Plain,
        &clock,
    )?;

    adapter.write(&event("aaaa"))?;
    adapter.write(&event("bbbb"))?;
    assert!(archives(dir.path())?.is_empty());

    clock.advance(Duration::seconds(1));
    adapter.write(&event("cccc"))?;

    let archives = archives(dir.path())?;
    assert_eq!(archives.len(), 1);
    assert_eq!(
        bodies(archives.first().ok_or("archive missing")?)?,
        vec!["aaaa", "bbbb"]
    );
    assert_eq!(bodies(&dir.path().join("app.log"))?, vec!["cccc"]);
    Ok(())
}

#[test]
fn reopening_non_empty_file_continues_line_count() -> TestResult {
    let dir = tempfile::tempdir()?;
    let clock = ManualClock::at(2024, 5, 6, 10)?;
    let policy = RotationPolicy::Lines { max_lines: 5 };

    let first = adapter(dir.path(), policy, FormatMode::Plain, &clock)?;
    for body in ["a", "b", "c"] {
        first.write(&event(body))?;
    }
    assert_eq!(first.segment_lines(), 3);
    drop(first);

    let second = adapter(dir.path(), policy, FormatMode::Plain, &clock)?;
    assert_eq!(second.segment_lines(), 3);
    for body in ["d", "e", "f"] {
        second.write(&event(body))?;
    }

    let archives = archives(dir.path())?;
    assert_eq!(archives.len(), 1);
    assert_eq!(
        bodies(archives.first().ok_or("archive missing")?)?,
        vec!["a", "b", "c", "d", "e"]
    );
    assert_eq!(bodies(&dir.path().join("app.log"))?, vec!["f"]);
    Ok(())
}

#[test]
fn hour_rotation_archives_under_open_bucket() -> TestResult {
    let dir = tempfile::tempdir()?;
    let clock = ManualClock::at(2024, 5, 6, 10)?;
    let adapter = adapter(
        dir.path(),
        RotationPolicy::Date(DateGranularity::Hour),
        FormatMode::Plain,
        &clock,
    )?;

    adapter.write(&event("ten"))?;
    clock.advance(Duration::minutes(59));
    adapter.write(&event("still-ten"))?;
    assert!(archives(dir.path())?.is_empty());

    clock.advance(Duration::minutes(2));
    adapter.write(&event("eleven"))?;

    let archive = dir.path().join("app_2024050610.log");
    assert_eq!(archives(dir.path())?, vec![archive.clone()]);
    assert_eq!(bodies(&archive)?, vec!["ten", "still-ten"]);
    assert_eq!(bodies(&dir.path().join("app.log"))?, vec!["eleven"]);
    Ok(())
}

#[test]
fn json_counts_one_line_per_write_plain_counts_newlines() -> TestResult {
    let dir = tempfile::tempdir()?;
    let clock = ManualClock::at(2024, 5, 6, 10)?;
    let policy = RotationPolicy::Lines { max_lines: 100 };

    let json_dir = dir.path().join("json");
    let json = adapter(&json_dir, policy, FormatMode::Json, &clock)?;
    json.write(&event("multi\nline"))?;
    json.write(&event("single"))?;
    assert_eq!(json.segment_lines(), 2);

    let plain_dir = dir.path().join("plain");
    let plain = adapter(&plain_dir, policy, FormatMode::Plain, &clock)?;
    plain.write(&event("multi\nline"))?;
    plain.write(&event("single"))?;
    assert_eq!(plain.segment_lines(), 3);
    Ok(())
}

#[test]
fn events_below_threshold_do_not_touch_the_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let clock = ManualClock::at(2024, 5, 6, 10)?;
    let adapter = adapter(
        dir.path(),
        RotationPolicy::Lines { max_lines: 1 },
        FormatMode::Plain,
        &clock,
    )?;
    adapter.write(&event("kept"))?;
    adapter.set_level(Level::Error);
    adapter.write(&event("skipped"))?;

    assert!(archives(dir.path())?.is_empty());
    assert_eq!(bodies(&dir.path().join("app.log"))?, vec!["kept"]);
    Ok(())
}

#[test]
fn concurrent_writers_never_lose_or_duplicate_lines() -> TestResult {
    let dir = tempfile::tempdir()?;
    let clock = ManualClock::at(2024, 5, 6, 10)?;
    let adapter = Arc::new(adapter(
        dir.path(),
        RotationPolicy::Lines { max_lines: 10 },
        FormatMode::Plain,
        &clock,
    )?);

    let mut workers = Vec::new();
    for worker in 0..4 {
        let adapter = Arc::clone(&adapter);
        workers.push(thread::spawn(move || {
            for index in 0..50 {
                let body = format!("w{worker}-{index}");
                if adapter.write(&event(&body)).is_err() {
                    return false;
                }
            }
            true
        }));
    }
    for worker in workers {
        assert!(worker.join().unwrap_or(false));
    }

    let mut seen = BTreeSet::new();
    let mut total = 0;
    for entry in std::fs::read_dir(dir.path())? {
        let path = entry?.path();
        let lines = bodies(&path)?;
        assert!(lines.len() <= 10, "segment {} too long", path.display());
        total += lines.len();
        seen.extend(lines);
    }
    assert_eq!(total, 200);
    assert_eq!(seen.len(), 200);
    Ok(())
}

#[test]
fn flush_reopens_file_moved_away() -> TestResult {
    let dir = tempfile::tempdir()?;
    let clock = ManualClock::at(2024, 5, 6, 10)?;
    let adapter = adapter(
        dir.path(),
        RotationPolicy::Lines { max_lines: 100 },
        FormatMode::Plain,
        &clock,
    )?;
    adapter.write(&event("before"))?;
    std::fs::rename(dir.path().join("app.log"), dir.path().join("moved.log"))?;

    adapter.flush()?;
    adapter.write(&event("after"))?;

    assert_eq!(bodies(&dir.path().join("moved.log"))?, vec!["before"]);
    assert_eq!(bodies(&dir.path().join("app.log"))?, vec!["after"]);
    Ok(())
}
