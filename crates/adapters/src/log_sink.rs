//! Standard output sink for the console adapter.

use rotolog_ports::LogSink;
use std::io::{self, Write};

/// Log sink that writes to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutLogSink;

impl LogSink for StdoutLogSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        io::stdout().lock().write_all(line.as_bytes())
    }

    fn flush(&self) -> io::Result<()> {
        io::stdout().lock().flush()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::LogSink;
    use std::io;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    pub(crate) struct MemorySink {
        lines: Mutex<Vec<String>>,
    }

    impl MemorySink {
        pub(crate) fn take(&self) -> Vec<String> {
            let mut guard = self.lines.lock().expect("memory sink lock");
            std::mem::take(&mut *guard)
        }
    }

    impl LogSink for MemorySink {
        fn write_line(&self, line: &str) -> io::Result<()> {
            let mut guard = self.lines.lock().expect("memory sink lock");
            guard.push(line.to_string());
            Ok(())
        }
    }

    #[test]
    fn memory_sink_captures_lines() -> io::Result<()> {
        let sink = MemorySink::default();
        sink.write_line("hello\n")?;
        sink.write_line("world\n")?;
        sink.flush()?;

        let lines = sink.take();
        assert_eq!(lines, vec!["hello\n".to_string(), "world\n".to_string()]);
        Ok(())
    }
}
