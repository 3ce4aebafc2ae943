//! # rotolog-ports
//!
//! Port traits for the rotolog hexagonal architecture.
//!
//! This crate defines the interfaces between the dispatcher and the output
//! adapters. It depends only on `domain` and `shared`.

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod adapter;
pub mod clock;
pub mod sink;

pub use adapter::*;
pub use clock::*;
pub use sink::*;

// Re-export selected domain types used in port signatures, so adapter crates
// can implement ports without directly depending on `rotolog-domain`.
pub use rotolog_domain::{AdapterId, AdapterSpec, FormatMode, Level, LogEvent, SourceLocation};
