use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project-local configuration directory
pub const CONFIG_DIR: &str = ".coopsurplus";

/// Prefix for environment overrides, e.g. `COOPSURPLUS_NEGOTIATION__FAIRNESS_WEIGHT`
pub const ENV_PREFIX: &str = "COOPSURPLUS_";

/// Configuration error types
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid synergy_multiplier: {0}. Must be finite and at least 0.01")]
    InvalidSynergyMultiplier(f64),

    #[error("Invalid dependency_risk_factor: {0}. Must be finite and non-negative")]
    InvalidRiskFactor(f64),

    #[error("Invalid pattern_capacity: {0}. Must be at least 1")]
    InvalidPatternCapacity(usize),

    #[error("Invalid max_iterations: {0}. Must be at least 1")]
    InvalidMaxIterations(usize),

    #[error("Invalid equilibrium_tolerance: {0}. Must be finite and positive")]
    InvalidTolerance(f64),

    #[error("Invalid fairness_weight: {0}. Must be between 0.0 and 1.0")]
    InvalidFairnessWeight(f64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .coopsurplus/config.yaml (project config)
    /// 3. .coopsurplus/local.yaml (project local overrides, optional)
    /// 4. Environment variables (COOPSURPLUS_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(format!("{CONFIG_DIR}/config.yaml")))
            .merge(Yaml::file(format!("{CONFIG_DIR}/local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let surplus = &config.surplus;
        if !surplus.synergy_multiplier.is_finite() || surplus.synergy_multiplier < 0.01 {
            return Err(ConfigError::InvalidSynergyMultiplier(
                surplus.synergy_multiplier,
            ));
        }

        if !surplus.dependency_risk_factor.is_finite() || surplus.dependency_risk_factor < 0.0 {
            return Err(ConfigError::InvalidRiskFactor(surplus.dependency_risk_factor));
        }

        if surplus.pattern_capacity == 0 {
            return Err(ConfigError::InvalidPatternCapacity(surplus.pattern_capacity));
        }

        let negotiation = &config.negotiation;
        if negotiation.max_iterations == 0 {
            return Err(ConfigError::InvalidMaxIterations(negotiation.max_iterations));
        }

        if !negotiation.equilibrium_tolerance.is_finite() || negotiation.equilibrium_tolerance <= 0.0
        {
            return Err(ConfigError::InvalidTolerance(
                negotiation.equilibrium_tolerance,
            ));
        }

        if !(0.0..=1.0).contains(&negotiation.fairness_weight) {
            return Err(ConfigError::InvalidFairnessWeight(
                negotiation.fairness_weight,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(
                config.logging.rotation.clone(),
            ));
        }

        Ok(())
    }
}
