//! # rotolog-adapters
//!
//! Adapter implementations for ports (console, rotating file, stdout sink,
//! system clock). This crate depends on `ports`, `domain`, and `shared`.

pub mod clock;
pub mod console;
pub mod factory;
pub mod file;
/// Event encoders (plain text, JSON, ANSI color).
pub mod formatter;
pub mod fs;
pub mod log_sink;
pub mod rotation;

pub use clock::SystemClock;
pub use console::{CONSOLE_KIND, ConsoleAdapter};
pub use factory::{ConsoleFactory, FileFactory};
pub use file::{FILE_KIND, FileAdapter, FileOptions, RotationConfigError};
pub use log_sink::StdoutLogSink;
pub use rotation::{RotationEngine, Segment};

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotolog_ports::ports_crate_version;
    use rotolog_shared::shared_crate_version;

    fn workspace_deps() -> Vec<String> {
        let cargo_toml = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut deps = Vec::new();
        let mut in_deps = false;
        let mut in_dev_deps = false;

        for raw_line in cargo_toml.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                in_deps = line == "[dependencies]";
                in_dev_deps = line == "[dev-dependencies]";
                continue;
            }
            if !(in_deps || in_dev_deps) {
                continue;
            }
            if line.starts_with("rotolog-") {
                let key = line.split('=').next().unwrap_or("").trim();
                let name = key.split('.').next().unwrap_or("").trim();
                deps.push(name.to_string());
            }
        }

        deps
    }

    #[test]
    fn adapters_do_not_depend_on_app_or_infra() {
        let deps = workspace_deps();
        let forbidden = ["rotolog-app", "rotolog-infra", "rotolog-config"];

        for dep in &deps {
            assert!(
                !forbidden.contains(&dep.as_str()),
                "forbidden dependency found: {dep}"
            );
        }
    }

    #[test]
    fn adapters_crate_compiles() {
        let version = adapters_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn adapters_can_use_ports_and_shared() {
        let ports_version = ports_crate_version();
        let shared_version = shared_crate_version();

        assert!(!ports_version.is_empty());
        assert!(!shared_version.is_empty());
    }
}
