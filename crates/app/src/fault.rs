//! Operator-visible channel for isolated adapter failures.

use rotolog_ports::{AdapterId, LogSink};
use rotolog_shared::ErrorEnvelope;
use std::io::{self, Write};

/// Default fault channel: standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrFaultSink;

impl LogSink for StderrFaultSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        io::stderr().lock().write_all(line.as_bytes())
    }
}

/// Report one adapter failure without interrupting dispatch.
pub(crate) fn report(sink: &dyn LogSink, adapter: &AdapterId, error: &ErrorEnvelope) {
    tracing::warn!(adapter = %adapter, code = %error.code, "adapter write failed");
    let line = format!("rotolog: adapter {adapter} write failed: {error}\n");
    if let Err(sink_error) = sink.write_line(&line) {
        tracing::warn!(error = %sink_error, "fault sink write failed");
    }
}
