use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Surplus engine parameters
    #[serde(default)]
    pub surplus: SurplusConfig,

    /// Negotiation engine parameters
    #[serde(default)]
    pub negotiation: NegotiationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Initial adaptive parameters of the surplus engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SurplusConfig {
    /// Scales how strongly dependency density rewards a cluster
    #[serde(default = "default_synergy_multiplier")]
    pub synergy_multiplier: f64,

    /// Discount applied per external dependency
    #[serde(default = "default_dependency_risk_factor")]
    pub dependency_risk_factor: f64,

    /// Maximum number of learned pattern modifiers retained
    #[serde(default = "default_pattern_capacity")]
    pub pattern_capacity: usize,
}

const fn default_synergy_multiplier() -> f64 {
    0.15
}

const fn default_dependency_risk_factor() -> f64 {
    0.1
}

const fn default_pattern_capacity() -> usize {
    1024
}

impl Default for SurplusConfig {
    fn default() -> Self {
        Self {
            synergy_multiplier: default_synergy_multiplier(),
            dependency_risk_factor: default_dependency_risk_factor(),
            pattern_capacity: default_pattern_capacity(),
        }
    }
}

/// Bargaining loop configuration, fixed for the lifetime of an engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NegotiationConfig {
    /// Upper bound on bargaining rounds
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Convergence threshold for variance change and total deviation
    #[serde(default = "default_equilibrium_tolerance")]
    pub equilibrium_tolerance: f64,

    /// 0.0 = pure contribution-proportional, 1.0 = pure equal split
    #[serde(default = "default_fairness_weight")]
    pub fairness_weight: f64,
}

const fn default_max_iterations() -> usize {
    50
}

const fn default_equilibrium_tolerance() -> f64 {
    1e-6
}

const fn default_fairness_weight() -> f64 {
    0.3
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            equilibrium_tolerance: default_equilibrium_tolerance(),
            fairness_weight: default_fairness_weight(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; console only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// File rotation: daily, hourly, never
    #[serde(default = "default_log_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_log_rotation(),
        }
    }
}
