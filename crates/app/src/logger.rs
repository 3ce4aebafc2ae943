//! Logger core: adapter registry, per-event dispatch, sync and async modes.
//!
//! The registry is an ordered, copy-on-write snapshot of attached adapters.
//! Every accepted event is paired with the adapters whose threshold admitted
//! it at acceptance time; later level changes never re-filter events that are
//! already queued.
//!
//! In synchronous mode one dispatcher-wide lock is held for the whole
//! delivery, so every adapter observes events in acceptance order. In
//! asynchronous mode acceptance order is queue order and a single consumer
//! replays the queue.

use crate::async_engine::{AsyncEngine, Dispatch};
use crate::factories::{AdapterFactories, unknown_kind};
use crate::fault::{self, StderrFaultSink};
use chrono::Local;
use rotolog_domain::{AsyncOptions, TimeFormat};
use rotolog_ports::{AdapterId, AdapterSpec, Level, LogAdapter, LogEvent, LogSink, SourceLocation};
use rotolog_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result};
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Snapshot = Arc<[Arc<dyn LogAdapter>]>;

enum DispatchMode {
    Sync,
    Async(AsyncEngine),
}

/// Construction options for a [`Logger`].
#[derive(Clone)]
pub struct LoggerOptions {
    /// Timestamp rendering for `create_time`.
    pub time_format: TimeFormat,
    /// Capture the caller's file and line for every event.
    pub caller: bool,
    /// Channel receiving one line per isolated adapter failure.
    pub fault_sink: Arc<dyn LogSink>,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::default(),
            caller: true,
            fault_sink: Arc::new(StderrFaultSink),
        }
    }
}

impl fmt::Debug for LoggerOptions {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LoggerOptions")
            .field("time_format", &self.time_format)
            .field("caller", &self.caller)
            .finish_non_exhaustive()
    }
}

struct LoggerInner {
    factories: AdapterFactories,
    registry: Mutex<()>,
    adapters: RwLock<Snapshot>,
    mode: RwLock<DispatchMode>,
    sync_gate: Mutex<()>,
    time_format: RwLock<TimeFormat>,
    caller: AtomicBool,
    fault_sink: Arc<dyn LogSink>,
}

/// Structured logger dispatching events to attached adapters.
///
/// Cloning is cheap; clones share adapters and dispatch mode. Dropping the
/// last clone drains the async queue and joins its consumer.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Logger")
            .field("factories", &self.inner.factories)
            .field("levels", &self.levels())
            .field("async", &self.async_options())
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Synchronous logger with default options and no adapters.
    #[must_use]
    pub fn new(factories: AdapterFactories) -> Self {
        Self::with_options(factories, LoggerOptions::default())
    }

    /// Synchronous logger with explicit options and no adapters.
    #[must_use]
    pub fn with_options(factories: AdapterFactories, options: LoggerOptions) -> Self {
        let empty: Snapshot = Arc::from(Vec::new());
        Self {
            inner: Arc::new(LoggerInner {
                factories,
                registry: Mutex::new(()),
                adapters: RwLock::new(empty),
                mode: RwLock::new(DispatchMode::Sync),
                sync_gate: Mutex::new(()),
                time_format: RwLock::new(options.time_format),
                caller: AtomicBool::new(options.caller),
                fault_sink: options.fault_sink,
            }),
        }
    }

    /// Factory registry this logger resolves adapter kinds with.
    #[must_use]
    pub fn factories(&self) -> &AdapterFactories {
        &self.inner.factories
    }

    // -------------------------------------------------------------------------
    // Registry
    // -------------------------------------------------------------------------

    /// Attach an adapter.
    ///
    /// Fails when the id is already attached or no factory is registered for
    /// the adapter's kind. `init` runs before the adapter becomes visible to
    /// dispatch; when it fails the registry is left unchanged.
    pub fn attach(&self, adapter: Arc<dyn LogAdapter>) -> Result<()> {
        let _registry = lock(&self.inner.registry);
        if !self.inner.factories.contains(adapter.kind()) {
            return Err(unknown_kind(adapter.kind()).with_metadata("adapter", adapter.id().as_str()));
        }
        let current = self.inner.snapshot();
        if current.iter().any(|attached| attached.id() == adapter.id()) {
            return Err(ErrorEnvelope::expected(
                ErrorCode::duplicate_adapter(),
                format!("adapter `{}` is already attached", adapter.id()),
            )
            .with_metadata("adapter", adapter.id().as_str()));
        }

        adapter.init()?;

        let mut next: Vec<Arc<dyn LogAdapter>> = current.iter().cloned().collect();
        next.push(Arc::clone(&adapter));
        *write(&self.inner.adapters) = Arc::from(next);
        tracing::debug!(
            adapter = %adapter.id(),
            kind = adapter.kind(),
            level = %adapter.level(),
            "adapter attached"
        );
        Ok(())
    }

    /// Build an adapter from `spec` with the registered factory and attach it.
    pub fn attach_spec(&self, spec: &AdapterSpec) -> Result<()> {
        if self.contains(&spec.id) {
            return Err(ErrorEnvelope::expected(
                ErrorCode::duplicate_adapter(),
                format!("adapter `{}` is already attached", spec.id),
            )
            .with_metadata("adapter", spec.id.as_str()));
        }
        let adapter = self.inner.factories.build(spec)?;
        self.attach(adapter)
    }

    /// Remove the adapter with `id`; a no-op when it is not attached.
    ///
    /// Events already accepted for the adapter are still delivered to it.
    pub fn detach(&self, id: &str) {
        let _registry = lock(&self.inner.registry);
        let current = self.inner.snapshot();
        if !current.iter().any(|adapter| adapter.id().as_str() == id) {
            return;
        }
        let next: Vec<Arc<dyn LogAdapter>> = current
            .iter()
            .filter(|adapter| adapter.id().as_str() != id)
            .cloned()
            .collect();
        *write(&self.inner.adapters) = Arc::from(next);
        tracing::debug!(adapter = id, "adapter detached");
    }

    /// Returns true when an adapter with `id` is attached.
    #[must_use]
    pub fn contains(&self, id: &AdapterId) -> bool {
        self.inner
            .snapshot()
            .iter()
            .any(|adapter| adapter.id() == id)
    }

    /// Attached adapter ids in attachment order.
    #[must_use]
    pub fn adapter_ids(&self) -> Vec<AdapterId> {
        self.inner
            .snapshot()
            .iter()
            .map(|adapter| adapter.id().clone())
            .collect()
    }

    /// Current threshold of every attached adapter, keyed by id.
    #[must_use]
    pub fn levels(&self) -> BTreeMap<AdapterId, Level> {
        self.inner
            .snapshot()
            .iter()
            .map(|adapter| (adapter.id().clone(), adapter.level()))
            .collect()
    }

    /// Set the threshold of every attached adapter. Affects events accepted
    /// after the call only.
    pub fn set_global_level(&self, level: Level) {
        for adapter in self.inner.snapshot().iter() {
            adapter.set_level(level);
        }
        tracing::debug!(level = %level, "global level set");
    }

    /// Set the threshold of one adapter. Returns false when it is not attached.
    pub fn set_level(&self, id: &str, level: Level) -> bool {
        let snapshot = self.inner.snapshot();
        let Some(adapter) = snapshot.iter().find(|adapter| adapter.id().as_str() == id) else {
            return false;
        };
        adapter.set_level(level);
        true
    }

    // -------------------------------------------------------------------------
    // Global settings
    // -------------------------------------------------------------------------

    /// Replace the timestamp format used for new events.
    pub fn set_time_format(&self, format: TimeFormat) -> Result<()> {
        validate_time_format(&format)?;
        *write(&self.inner.time_format) = format;
        Ok(())
    }

    /// Current timestamp format.
    #[must_use]
    pub fn time_format(&self) -> TimeFormat {
        read(&self.inner.time_format).clone()
    }

    /// Enable or disable caller capture for new events.
    pub fn set_caller_capture(&self, enabled: bool) {
        self.inner.caller.store(enabled, Ordering::Release);
    }

    /// Returns true when caller capture is enabled.
    #[must_use]
    pub fn caller_capture(&self) -> bool {
        self.inner.caller.load(Ordering::Acquire)
    }

    // -------------------------------------------------------------------------
    // Dispatch mode
    // -------------------------------------------------------------------------

    /// Switch to asynchronous dispatch with a fresh bounded queue.
    ///
    /// When already asynchronous, the previous queue is drained to completion
    /// before the new one becomes active.
    pub fn set_async(&self, options: AsyncOptions) -> Result<()> {
        if !options.has_valid_capacity() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_async_capacity"),
                format!(
                    "async capacity must be between 1 and {}",
                    AsyncOptions::MAX_CAPACITY
                ),
            )
            .with_metadata("capacity", options.capacity.to_string()));
        }

        let mut mode = write(&self.inner.mode);
        if let DispatchMode::Async(previous) = &mut *mode {
            previous.shutdown();
        }
        let engine = AsyncEngine::start(options, Arc::clone(&self.inner.fault_sink))?;
        *mode = DispatchMode::Async(engine);
        Ok(())
    }

    /// Switch to asynchronous dispatch with a blocking queue of `capacity`.
    pub fn set_async_capacity(&self, capacity: usize) -> Result<()> {
        self.set_async(AsyncOptions::blocking(capacity))
    }

    /// Drain the async queue, stop its consumer and return to synchronous
    /// dispatch. A no-op in synchronous mode.
    pub fn set_sync(&self) {
        let mut mode = write(&self.inner.mode);
        if let DispatchMode::Async(engine) = &mut *mode {
            engine.shutdown();
        }
        *mode = DispatchMode::Sync;
    }

    /// Queue settings when asynchronous, `None` when synchronous.
    #[must_use]
    pub fn async_options(&self) -> Option<AsyncOptions> {
        match &*read(&self.inner.mode) {
            DispatchMode::Sync => None,
            DispatchMode::Async(engine) => Some(engine.options()),
        }
    }

    /// Events accepted but not yet delivered (always zero when synchronous).
    #[must_use]
    pub fn pending(&self) -> u64 {
        match &*read(&self.inner.mode) {
            DispatchMode::Sync => 0,
            DispatchMode::Async(engine) => engine.outstanding(),
        }
    }

    // -------------------------------------------------------------------------
    // Logging
    // -------------------------------------------------------------------------

    /// Log `body` at `level`.
    ///
    /// Synchronous mode returns after every accepting adapter was written; a
    /// failing adapter is reported on the fault channel and does not stop the
    /// others, and the call then returns `dispatch:adapter_failed`.
    /// Asynchronous mode returns once the event is queued; with a rejecting
    /// queue a full queue yields a retriable `dispatch:queue_full`.
    #[track_caller]
    pub fn log(&self, level: Level, body: impl fmt::Display) -> Result<()> {
        if level == Level::Off {
            return Ok(());
        }
        let caller = Location::caller();
        let location = self
            .caller_capture()
            .then(|| SourceLocation::from_path(caller.file(), caller.line()));

        let mode = read(&self.inner.mode);
        match &*mode {
            DispatchMode::Sync => {
                let _order = lock(&self.inner.sync_gate);
                let targets = self.inner.targets(level);
                if targets.is_empty() {
                    return Ok(());
                }
                let event = self.inner.build_event(level, &body, location);
                self.inner.deliver_sync(&event, &targets)
            },
            DispatchMode::Async(engine) => {
                let targets = self.inner.targets(level);
                if targets.is_empty() {
                    return Ok(());
                }
                let event = Arc::new(self.inner.build_event(level, &body, location));
                engine.submit(Dispatch { event, targets })
            },
        }
    }

    /// Log at DEBUG.
    #[track_caller]
    pub fn debug(&self, body: impl fmt::Display) -> Result<()> {
        self.log(Level::Debug, body)
    }

    /// Log at INFO.
    #[track_caller]
    pub fn info(&self, body: impl fmt::Display) -> Result<()> {
        self.log(Level::Info, body)
    }

    /// Log at WARN.
    #[track_caller]
    pub fn warn(&self, body: impl fmt::Display) -> Result<()> {
        self.log(Level::Warn, body)
    }

    /// Log at ERROR.
    #[track_caller]
    pub fn error(&self, body: impl fmt::Display) -> Result<()> {
        self.log(Level::Error, body)
    }

    /// Log at FATAL. The process keeps running.
    #[track_caller]
    pub fn fatal(&self, body: impl fmt::Display) -> Result<()> {
        self.log(Level::Fatal, body)
    }

    // -------------------------------------------------------------------------
    // Flush
    // -------------------------------------------------------------------------

    /// Deliver every accepted event, then flush every attached adapter.
    ///
    /// In asynchronous mode this blocks until the consumer has delivered all
    /// events accepted before the call. Adapter flush failures are reported
    /// on the fault channel and the first one is returned after all adapters
    /// were flushed.
    pub fn flush(&self) -> Result<()> {
        {
            let mode = read(&self.inner.mode);
            if let DispatchMode::Async(engine) = &*mode {
                engine.drain();
            }
        }

        let mut first_error = None;
        for adapter in self.inner.snapshot().iter() {
            if let Err(error) = adapter.flush() {
                fault::report(self.inner.fault_sink.as_ref(), adapter.id(), &error);
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// [`Logger::flush`] for callers running inside a tokio runtime: the
    /// blocking drain runs on the runtime's blocking pool.
    pub async fn flush_async(&self) -> Result<()> {
        let logger = self.clone();
        tokio::task::spawn_blocking(move || logger.flush())
            .await
            .map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::internal(),
                    format!("flush task failed: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?
    }
}

impl LoggerInner {
    fn snapshot(&self) -> Snapshot {
        Arc::clone(&read(&self.adapters))
    }

    fn targets(&self, level: Level) -> Vec<Arc<dyn LogAdapter>> {
        self.snapshot()
            .iter()
            .filter(|adapter| adapter.accepts(level))
            .cloned()
            .collect()
    }

    fn build_event(
        &self,
        level: Level,
        body: &dyn fmt::Display,
        location: Option<SourceLocation>,
    ) -> LogEvent {
        let create_time = render_now(&read(&self.time_format));
        LogEvent::new(create_time, level, body.to_string(), location)
    }

    fn deliver_sync(&self, event: &LogEvent, targets: &[Arc<dyn LogAdapter>]) -> Result<()> {
        let mut failed = Vec::new();
        for adapter in targets {
            if let Err(error) = adapter.append(event) {
                fault::report(self.fault_sink.as_ref(), adapter.id(), &error);
                failed.push(adapter.id().as_str().to_owned());
            }
        }
        if failed.is_empty() {
            return Ok(());
        }
        Err(ErrorEnvelope::unexpected(
            ErrorCode::adapter_failed(),
            format!("{} adapter(s) failed to write the event", failed.len()),
            ErrorClass::NonRetriable,
        )
        .with_metadata("adapters", failed.join(",")))
    }
}

fn render_now(format: &TimeFormat) -> String {
    let now = Local::now();
    let mut rendered = String::new();
    if write!(rendered, "{}", now.format(format.pattern())).is_ok() {
        return rendered;
    }
    now.format(TimeFormat::default().pattern()).to_string()
}

fn validate_time_format(format: &TimeFormat) -> Result<()> {
    use chrono::format::{Item, StrftimeItems};

    let pattern = format.pattern();
    if pattern.trim().is_empty() || StrftimeItems::new(pattern).any(|item| item == Item::Error) {
        return Err(ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_time_format"),
            format!("invalid time format pattern `{pattern}`"),
        )
        .with_metadata("pattern", pattern));
    }
    Ok(())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
