//! # rotolog-infra
//!
//! Composition root: built-in factory set, logger construction from config,
//! and config helpers for CLI surfaces.
//! This crate depends on `app`, `adapters`, `config`, and `shared`.

/// Config loading helpers used by CLI surfaces.
pub mod config_check;
/// Environment validation helpers used by CLI surfaces.
pub mod env_check;
/// Logger construction from config.
pub mod logger_factory;

pub use config_check::{ConfigOutput, load_effective_config, render_effective_config};
pub use env_check::{InfraError, InfraResult, validate_env_parsing};
pub use logger_factory::{build_logger, build_logger_with, default_factories, default_logger};

/// Returns the infra crate version.
#[must_use]
pub const fn infra_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
