//! # rotolog-config
//!
//! Logger configuration schema, validation, env overrides, and loading.
//! This crate depends on `domain` and `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + file).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use schema::{
    AdapterConfig, AsyncConfig, CURRENT_CONFIG_VERSION, ConfigSchemaError, LoggerConfig,
    ValidatedLoggerConfig, parse_logger_config_json, parse_logger_config_toml,
};

pub use env::{
    ENV_ASYNC_CAPACITY, ENV_CALLER, ENV_LEVEL, EnvParseError, LoggerEnv, apply_env_overrides,
};
pub use load::{
    ConfigFormat, load_logger_config_from_path, load_logger_config_from_sources, to_pretty_json,
    to_pretty_toml,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotolog_domain::domain_crate_version;
    use rotolog_shared::shared_crate_version;

    #[test]
    fn config_crate_compiles() {
        let version = config_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn config_can_use_domain_and_shared() {
        let domain_version = domain_crate_version();
        let shared_version = shared_crate_version();

        assert!(!domain_version.is_empty());
        assert!(!shared_version.is_empty());
    }
}
