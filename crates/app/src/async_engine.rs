//! Bounded queue and single background consumer for asynchronous dispatch.
//!
//! Producers register each accepted event with a [`DrainGate`] before
//! enqueueing it; the consumer completes the gate entry only after the event
//! reached every target adapter. Draining therefore waits on the gate, not on
//! the queue length, so an event that is dequeued but still being written
//! keeps `flush` waiting.

use crate::fault;
use rotolog_domain::{AsyncOptions, OverflowPolicy};
use rotolog_ports::{LogAdapter, LogEvent, LogSink};
use rotolog_shared::{DrainGate, ErrorClass, ErrorCode, ErrorEnvelope, Result};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// One accepted event together with the adapters that accepted it.
pub(crate) struct Dispatch {
    pub(crate) event: Arc<LogEvent>,
    pub(crate) targets: Vec<Arc<dyn LogAdapter>>,
}

enum Control {
    Drain,
    Shutdown,
}

enum Step {
    Deliver(Dispatch),
    Drain,
    Stop,
}

/// Running async dispatcher.
pub(crate) struct AsyncEngine {
    options: AsyncOptions,
    data: flume::Sender<Dispatch>,
    control: flume::Sender<Control>,
    gate: Arc<DrainGate>,
    worker: Option<JoinHandle<()>>,
}

impl AsyncEngine {
    /// Allocate the queue and start the consumer thread.
    pub(crate) fn start(options: AsyncOptions, fault_sink: Arc<dyn LogSink>) -> Result<Self> {
        let (data, data_rx) = flume::bounded(options.capacity);
        let (control, control_rx) = flume::unbounded();
        let gate = Arc::new(DrainGate::new());

        let worker_gate = Arc::clone(&gate);
        let worker = thread::Builder::new()
            .name("rotolog-dispatch".into())
            .spawn(move || consume(&data_rx, &control_rx, &worker_gate, fault_sink.as_ref()))
            .map_err(|error| {
                ErrorEnvelope::from(error).with_metadata("operation", "spawn_consumer")
            })?;

        tracing::debug!(
            capacity = options.capacity,
            on_full = %options.on_full,
            "async dispatch started"
        );
        Ok(Self {
            options,
            data,
            control,
            gate,
            worker: Some(worker),
        })
    }

    pub(crate) const fn options(&self) -> AsyncOptions {
        self.options
    }

    /// Events accepted but not yet delivered to every target.
    pub(crate) fn outstanding(&self) -> u64 {
        self.gate.outstanding()
    }

    /// Enqueue one dispatch, honouring the overflow policy.
    pub(crate) fn submit(&self, dispatch: Dispatch) -> Result<()> {
        self.gate.begin();
        let sent = match self.options.on_full {
            OverflowPolicy::Block => self.data.send(dispatch).map_err(|_| closed()),
            OverflowPolicy::Reject => self.data.try_send(dispatch).map_err(|error| match error {
                flume::TrySendError::Full(_) => queue_full(self.options.capacity),
                flume::TrySendError::Disconnected(_) => closed(),
            }),
        };
        if sent.is_err() {
            self.gate.complete();
        }
        sent
    }

    /// Block until every accepted event has been delivered.
    pub(crate) fn drain(&self) {
        // A dead consumer means nothing is left to wait for.
        if self.control.send(Control::Drain).is_err() {
            return;
        }
        self.gate.wait_idle();
    }

    /// Deliver everything still queued, then stop and join the consumer.
    pub(crate) fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        // The consumer drains the data queue before honouring the shutdown.
        let _ = self.control.send(Control::Shutdown);
        if worker.join().is_err() {
            tracing::warn!("async dispatch consumer panicked");
        }
        tracing::debug!("async dispatch stopped");
    }
}

impl Drop for AsyncEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn consume(
    data: &flume::Receiver<Dispatch>,
    control: &flume::Receiver<Control>,
    gate: &DrainGate,
    fault_sink: &dyn LogSink,
) {
    loop {
        let step = flume::Selector::new()
            .recv(data, |message| message.map_or(Step::Stop, Step::Deliver))
            .recv(control, |message| match message {
                Ok(Control::Drain) => Step::Drain,
                Ok(Control::Shutdown) | Err(_) => Step::Stop,
            })
            .wait();

        match step {
            Step::Deliver(dispatch) => deliver(dispatch, gate, fault_sink),
            Step::Drain => drain_queued(data, gate, fault_sink),
            Step::Stop => {
                drain_queued(data, gate, fault_sink);
                return;
            },
        }
    }
}

fn drain_queued(data: &flume::Receiver<Dispatch>, gate: &DrainGate, fault_sink: &dyn LogSink) {
    while let Ok(dispatch) = data.try_recv() {
        deliver(dispatch, gate, fault_sink);
    }
}

fn deliver(dispatch: Dispatch, gate: &DrainGate, fault_sink: &dyn LogSink) {
    for adapter in &dispatch.targets {
        if let Err(error) = adapter.append(&dispatch.event) {
            fault::report(fault_sink, adapter.id(), &error);
        }
    }
    gate.complete();
}

fn queue_full(capacity: usize) -> ErrorEnvelope {
    ErrorEnvelope::expected_with_class(
        ErrorCode::queue_full(),
        "async log queue is full",
        ErrorClass::Retriable,
    )
    .with_metadata("capacity", capacity.to_string())
}

fn closed() -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::dispatcher_closed(),
        "async log consumer is not running",
        ErrorClass::NonRetriable,
    )
}
