//! Line sink boundary contract.

use std::io;

/// A sink that receives pre-formatted lines.
pub trait LogSink: Send + Sync {
    /// Write a line to the sink. The line carries its own terminator.
    fn write_line(&self, line: &str) -> io::Result<()>;

    /// Flush buffered output.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}
