//! Service layer
//!
//! - `cluster_graph`: flat dependency classification and graph metrics
//! - `surplus_engine`: cluster surplus with adaptive synergy parameters
//! - `negotiation_engine`: iterative bargaining over a surplus pool
//! - `synergy_recalibrator`: feeds realized outcomes back into the parameters

pub mod cluster_graph;
pub mod negotiation_engine;
pub mod surplus_engine;
pub mod synergy_recalibrator;

pub use cluster_graph::ClusterGraph;
pub use negotiation_engine::NegotiationEngine;
pub use surplus_engine::{PatternModifiers, SurplusEngine, MIN_PATTERN_MODIFIER};
pub use synergy_recalibrator::{RecalibrationUpdate, SynergyRecalibrator};

/// Round to 4 decimal places, the precision of every published figure.
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
