//! Output adapter boundary contract.

use rotolog_domain::{AdapterId, AdapterSpec, FormatMode, Level, LogEvent};
use rotolog_shared::Result;
use std::sync::Arc;

/// An output sink with its own severity threshold and write contract.
///
/// Implementations must be safe to call from the dispatcher thread and the
/// async consumer at the same time; per-adapter ordering is the caller's
/// responsibility, write atomicity is the adapter's.
pub trait LogAdapter: Send + Sync {
    /// Registry identifier.
    fn id(&self) -> &AdapterId;

    /// Factory name this adapter was built by.
    fn kind(&self) -> &str;

    /// Acquire resources. Called once, before the adapter becomes visible to
    /// dispatch.
    fn init(&self) -> Result<()>;

    /// Current threshold.
    fn level(&self) -> Level;

    /// Replace the threshold; affects future writes only.
    fn set_level(&self, level: Level);

    /// Output encoding.
    fn format(&self) -> FormatMode;

    /// Returns true when an event at `level` passes the threshold.
    fn accepts(&self, level: Level) -> bool {
        self.level().admits(level)
    }

    /// Deliver one event if it passes the threshold. The check happens before
    /// any other work (rotation, formatting).
    fn write(&self, event: &LogEvent) -> Result<()> {
        if !self.accepts(event.level()) {
            return Ok(());
        }
        self.append(event)
    }

    /// Deliver one event whose level was already admitted, without checking
    /// the threshold again. The dispatcher uses this for queued events so
    /// that level changes never re-filter them.
    fn append(&self, event: &LogEvent) -> Result<()>;

    /// Push buffered output to its destination.
    fn flush(&self) -> Result<()>;
}

/// Constructor for one adapter kind.
pub trait AdapterFactory: Send + Sync {
    /// Kind name this factory is registered under.
    fn kind(&self) -> &str;

    /// Build an adapter from its declarative description.
    ///
    /// Option validation happens here; the returned adapter is not yet
    /// initialised.
    fn build(&self, spec: &AdapterSpec) -> Result<Arc<dyn LogAdapter>>;
}
