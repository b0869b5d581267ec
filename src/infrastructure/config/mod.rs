//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - Programmatic defaults
//! - YAML file loading from `.coopsurplus/`
//! - `COOPSURPLUS_*` environment variable overrides
//! - Validation of engine parameters

pub mod loader;

pub use loader::{ConfigError, ConfigLoader, CONFIG_DIR, ENV_PREFIX};
