//! # rotolog-app
//!
//! The logger core: adapter registry, synchronous and asynchronous dispatch,
//! drain-to-empty flush.
//! This crate depends on `ports`, `domain`, and `shared`.

mod async_engine;
pub mod factories;
pub mod fault;
pub mod logger;

pub use factories::AdapterFactories;
pub use fault::StderrFaultSink;
pub use logger::{Logger, LoggerOptions};

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
