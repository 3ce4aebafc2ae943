//! # rotolog-domain
//!
//! Domain entities, primitives, and value objects for the rotolog logging core.
//!
//! This crate contains the core domain model with no infrastructure dependencies:
//!
//! - **Levels** - `Level`, `AtomicLevel`
//! - **Primitives** - `AdapterId`, `PrimitiveError`
//! - **Events** - `LogEvent`, `SourceLocation`
//! - **Formats** - `FormatMode`, `TimeFormat`
//! - **Dispatch** - `AsyncOptions`, `OverflowPolicy`
//! - **Rotation** - `RotationPolicy`, `DateGranularity`, `SizeUnit`
//! - **Specs** - `AdapterSpec`
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No infrastructure or adapter dependencies
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

// Re-export shared types for convenience
pub use rotolog_shared::shared_crate_version;

// =============================================================================
// DOMAIN MODULES
// =============================================================================

pub mod dispatch;
pub mod event;
pub mod format;
pub mod level;
pub mod primitives;
pub mod rotation;
pub mod spec;

pub use dispatch::{AsyncOptions, OverflowPolicy};
pub use event::{LogEvent, SourceLocation};
pub use format::{FormatMode, TimeFormat};
pub use level::{AtomicLevel, Level};
pub use primitives::{AdapterId, PrimitiveError};
pub use rotation::{DateGranularity, RotationPolicy, SizeUnit};
pub use spec::{AdapterOptions, AdapterSpec};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// =============================================================================
// TESTS
// =============================================================================
